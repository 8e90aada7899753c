//! Tool-using answer composer.
//!
//! The model is given one tool, `retrieve_faq_context`, and drives a bounded
//! conversational loop: each model turn either ends with a final answer or
//! requests tool invocations, which are executed against the retriever and
//! appended as tool-result turns. A hard turn cap bounds worst-case cost,
//! since the remote model's tool-calling behavior is not under our control.

use std::sync::Arc;

use serde_json::json;

use crate::error::RagError;
use crate::llm::{ChatMessage, ChatRequest, LlmProvider, ToolCall, ToolSpec};
use crate::store::{RetrievedDocument, Retriever};

pub const RETRIEVE_TOOL_NAME: &str = "retrieve_faq_context";
pub const MAX_AGENT_TURNS: usize = 6;

const AGENT_TOP_K: usize = 3;

const AGENT_SYSTEM_PROMPT: &str = "You are a friendly and professional e-commerce customer support assistant. \
Your knowledge comes exclusively from the company FAQ database. \
Always use the retrieve_faq_context tool to search for answers before responding. \
If the FAQ does not contain enough information, politely say so and suggest \
contacting customer support directly. \
Keep answers clear, concise, and helpful.";

fn retrieve_tool_spec() -> ToolSpec {
    ToolSpec {
        name: RETRIEVE_TOOL_NAME.to_string(),
        description: "Search the e-commerce FAQ knowledge base for answers relevant to the query. \
Use this tool to look up information about accounts, payments, orders, tracking, \
shipping, returns, refunds, products, and customer support contact."
            .to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The customer topic to search the FAQ database for"
                }
            },
            "required": ["query"]
        }),
    }
}

/// Serialize retrieved documents into the tool-result block format.
pub fn format_tool_context(docs: &[RetrievedDocument]) -> String {
    docs.iter()
        .map(|doc| format!("[FAQ #{}]\n{}", doc.document.metadata.index, doc.document.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub struct FaqAgent {
    retriever: Arc<dyn Retriever>,
    llm: Arc<dyn LlmProvider>,
    model: String,
}

impl FaqAgent {
    pub fn new(retriever: Arc<dyn Retriever>, llm: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self {
            retriever,
            llm,
            model: model.into(),
        }
    }

    /// Run the agent loop for one customer question.
    ///
    /// The conversation is ephemeral; nothing carries over between calls.
    pub async fn answer(&self, question: &str) -> Result<String, RagError> {
        let tools = [retrieve_tool_spec()];
        let mut conversation = vec![
            ChatMessage::system(AGENT_SYSTEM_PROMPT),
            ChatMessage::user(question),
        ];

        for turn in 0..MAX_AGENT_TURNS {
            let assistant = self
                .llm
                .chat_with_tools(ChatRequest::new(conversation.clone()), &tools, &self.model)
                .await?;

            if assistant.tool_calls.is_empty() {
                let answer = assistant.content.unwrap_or_default();
                tracing::debug!("Agent finished after {} turn(s)", turn + 1);
                return Ok(answer.trim().to_string());
            }

            let tool_calls = assistant.tool_calls.clone();
            conversation.push(assistant.into_message());

            for call in tool_calls {
                let result = self.execute_tool(&call).await?;
                conversation.push(ChatMessage::tool(call.id, result));
            }
        }

        Err(RagError::ModelUnavailable(format!(
            "agent did not produce a final answer within {} turns",
            MAX_AGENT_TURNS
        )))
    }

    /// Execute one requested tool call.
    ///
    /// Retrieval failures propagate; a malformed or unknown request is fed
    /// back to the model as the tool result so it can recover.
    async fn execute_tool(&self, call: &ToolCall) -> Result<String, RagError> {
        if call.function.name != RETRIEVE_TOOL_NAME {
            tracing::warn!("Model requested unknown tool '{}'", call.function.name);
            return Ok(format!(
                "Tool '{}' does not exist. The only available tool is '{}'.",
                call.function.name, RETRIEVE_TOOL_NAME
            ));
        }

        let query = match serde_json::from_str::<serde_json::Value>(&call.function.arguments) {
            Ok(args) => match args.get("query").and_then(|q| q.as_str()) {
                Some(query) => query.to_string(),
                None => {
                    return Ok("Tool call was missing the required 'query' argument.".to_string())
                }
            },
            Err(_) => return Ok("Tool call arguments were not valid JSON.".to_string()),
        };

        tracing::debug!("retrieve_faq_context('{}')", query);
        let docs = self.retriever.search(&query, AGENT_TOP_K).await?;
        Ok(format_tool_context(&docs))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::dataset::{DocumentMetadata, IndexedDocument};
    use crate::llm::AssistantTurn;
    use super::*;

    struct CountingRetriever {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Retriever for CountingRetriever {
        async fn search(&self, query: &str, _k: usize) -> Result<Vec<RetrievedDocument>, RagError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![RetrievedDocument {
                document: IndexedDocument {
                    content: format!("Q: {}\nA: stub answer.", query),
                    metadata: DocumentMetadata {
                        source: "Ecommerce_FAQ_Chatbot_dataset".to_string(),
                        question: query.to_string(),
                        index: 42,
                    },
                },
                score: 0.9,
            }])
        }
    }

    /// Chat provider that replays a fixed script of assistant turns and
    /// records every request it receives.
    struct ScriptedLlm {
        script: Mutex<Vec<AssistantTurn>>,
        requests: Mutex<Vec<ChatRequest>>,
    }

    impl ScriptedLlm {
        fn new(script: Vec<AssistantTurn>) -> Self {
            let mut script = script;
            script.reverse();
            Self {
                script: Mutex::new(script),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedLlm {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn chat(&self, _request: ChatRequest, _model_id: &str) -> Result<String, RagError> {
            unimplemented!("agent uses chat_with_tools")
        }

        async fn chat_with_tools(
            &self,
            request: ChatRequest,
            _tools: &[ToolSpec],
            _model_id: &str,
        ) -> Result<AssistantTurn, RagError> {
            self.requests.lock().unwrap().push(request);
            self.script
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| RagError::ModelUnavailable("script exhausted".to_string()))
        }

        async fn embed(&self, _inputs: &[String], _model_id: &str) -> Result<Vec<Vec<f32>>, RagError> {
            unimplemented!("agent never embeds")
        }
    }

    fn tool_call_turn(query: &str) -> AssistantTurn {
        AssistantTurn {
            content: None,
            tool_calls: vec![ToolCall {
                id: "call_1".to_string(),
                call_type: "function".to_string(),
                function: crate::llm::FunctionCall {
                    name: RETRIEVE_TOOL_NAME.to_string(),
                    arguments: format!("{{\"query\":\"{}\"}}", query),
                },
            }],
        }
    }

    fn final_turn(text: &str) -> AssistantTurn {
        AssistantTurn {
            content: Some(text.to_string()),
            tool_calls: Vec::new(),
        }
    }

    #[tokio::test]
    async fn one_tool_call_then_final_answer() {
        let retriever = Arc::new(CountingRetriever { calls: AtomicUsize::new(0) });
        let llm = Arc::new(ScriptedLlm::new(vec![
            tool_call_turn("return policy"),
            final_turn("You can return items within 30 days."),
        ]));
        let agent = FaqAgent::new(retriever.clone(), llm.clone(), "test/model");

        let answer = agent.answer("What is your return policy?").await.unwrap();

        assert_eq!(answer, "You can return items within 30 days.");
        assert_eq!(retriever.calls.load(Ordering::SeqCst), 1);

        // The second model turn must see the tool result appended.
        let requests = llm.requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        let last = requests[1].messages.last().unwrap();
        assert_eq!(last.role, "tool");
        assert_eq!(last.tool_call_id.as_deref(), Some("call_1"));
        assert!(last.content.as_deref().unwrap().starts_with("[FAQ #42]\nQ: return policy"));
    }

    #[tokio::test]
    async fn direct_final_answer_skips_retrieval() {
        let retriever = Arc::new(CountingRetriever { calls: AtomicUsize::new(0) });
        let llm = Arc::new(ScriptedLlm::new(vec![final_turn("Hello!")]));
        let agent = FaqAgent::new(retriever.clone(), llm, "test/model");

        let answer = agent.answer("Hi").await.unwrap();
        assert_eq!(answer, "Hello!");
        assert_eq!(retriever.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn turn_cap_bounds_the_loop() {
        let retriever = Arc::new(CountingRetriever { calls: AtomicUsize::new(0) });
        let script = (0..MAX_AGENT_TURNS + 2).map(|_| tool_call_turn("loop")).collect();
        let llm = Arc::new(ScriptedLlm::new(script));
        let agent = FaqAgent::new(retriever.clone(), llm, "test/model");

        let err = agent.answer("Keep looping").await.unwrap_err();
        assert!(matches!(err, RagError::ModelUnavailable(_)));
        assert!(err.to_string().contains(&MAX_AGENT_TURNS.to_string()));
        assert_eq!(retriever.calls.load(Ordering::SeqCst), MAX_AGENT_TURNS);
    }

    #[tokio::test]
    async fn unknown_tool_is_reported_back_not_fatal() {
        let retriever = Arc::new(CountingRetriever { calls: AtomicUsize::new(0) });
        let bad_call = AssistantTurn {
            content: None,
            tool_calls: vec![ToolCall {
                id: "call_x".to_string(),
                call_type: "function".to_string(),
                function: crate::llm::FunctionCall {
                    name: "delete_everything".to_string(),
                    arguments: "{}".to_string(),
                },
            }],
        };
        let llm = Arc::new(ScriptedLlm::new(vec![bad_call, final_turn("Sorry about that.")]));
        let agent = FaqAgent::new(retriever.clone(), llm.clone(), "test/model");

        let answer = agent.answer("Do something odd").await.unwrap();
        assert_eq!(answer, "Sorry about that.");
        assert_eq!(retriever.calls.load(Ordering::SeqCst), 0);

        let requests = llm.requests.lock().unwrap();
        let tool_result = requests[1].messages.last().unwrap();
        assert!(tool_result.content.as_deref().unwrap().contains("does not exist"));
    }

    #[test]
    fn tool_context_serialization() {
        let docs = vec![
            RetrievedDocument {
                document: IndexedDocument {
                    content: "Q: A?\nA: a.".to_string(),
                    metadata: DocumentMetadata {
                        source: "s".to_string(),
                        question: "A?".to_string(),
                        index: 1,
                    },
                },
                score: 1.0,
            },
            RetrievedDocument {
                document: IndexedDocument {
                    content: "Q: B?\nA: b.".to_string(),
                    metadata: DocumentMetadata {
                        source: "s".to_string(),
                        question: "B?".to_string(),
                        index: 2,
                    },
                },
                score: 0.5,
            },
        ];
        assert_eq!(format_tool_context(&docs), "[FAQ #1]\nQ: A?\nA: a.\n\n[FAQ #2]\nQ: B?\nA: b.");
    }
}
