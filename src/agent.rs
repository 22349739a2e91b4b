use crate::error::{RcaError, Result};
use crate::models::LLMBackend;
use crate::tools::Tool; // Tool 트레이트 가져오기
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub const DEFAULT_MAX_TURNS: usize = 25;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn new(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new("system", content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new("assistant", content)
    }
}

pub struct Agent {
    name: String,
    model: Box<dyn LLMBackend>,
    history: Vec<Message>,
    // 원본 시스템 프롬프트 (도구 설명이 붙기 전의 순수 페르소나)
    base_system_prompt: String,
    // 등록된 도구 저장소 (이름 -> 도구 객체). 프롬프트 순서를 고정하려고 BTreeMap 사용
    tools: BTreeMap<String, Box<dyn Tool>>,
    max_turns: usize,
}

/// Builder for configuring an `Agent` before construction.
pub struct AgentBuilder {
    name: String,
    model: Box<dyn LLMBackend>,
    system_prompt: String,
    tools: Vec<Box<dyn Tool>>,
    max_turns: usize,
}

impl Agent {
    /// 에이전트 생성
    pub fn new(name: &str, model: Box<dyn LLMBackend>, system_prompt: &str) -> Self {
        let mut agent = Self {
            name: name.to_string(),
            model,
            history: Vec::new(),
            base_system_prompt: system_prompt.to_string(),
            tools: BTreeMap::new(),
            max_turns: DEFAULT_MAX_TURNS,
        };

        // 초기 시스템 메시지 설정 (도구가 없으면 기본 프롬프트만 들어감)
        agent.refresh_system_message();

        agent
    }

    /// Builder entrypoint for fluent configuration.
    pub fn builder(name: &str, model: Box<dyn LLMBackend>, system_prompt: &str) -> AgentBuilder {
        AgentBuilder {
            name: name.to_string(),
            model,
            system_prompt: system_prompt.to_string(),
            tools: Vec::new(),
            max_turns: DEFAULT_MAX_TURNS,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 도구 등록 메서드
    /// 사용자가 `agent.register_tool(ListTablesInDirectory::new())` 형태로 호출
    pub fn register_tool(&mut self, tool: impl Tool + 'static) -> &mut Self {
        self.register_tool_box(Box::new(tool))
    }

    fn register_tool_box(&mut self, tool: Box<dyn Tool>) -> &mut Self {
        let name = tool.name().to_string();
        self.tools.insert(name, tool);

        // 도구가 추가되었으니 시스템 프롬프트를 갱신하여 LLM에게 알려줌
        self.refresh_system_message();
        self
    }

    /// Full conversation, system message first.
    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Drops every turn but the system message.
    pub fn reset(&mut self) {
        self.history.truncate(1);
    }

    /// 시스템 메시지를 재구성하는 내부 메서드
    /// (기본 페르소나 + 도구 정의)
    fn refresh_system_message(&mut self) {
        let mut full_prompt = self.base_system_prompt.clone();

        // 도구가 있다면, 사용법과 목록을 프롬프트에 추가
        if !self.tools.is_empty() {
            full_prompt.push_str("\n\n## Available Tools\n");
            full_prompt.push_str("You have access to the following tools. To use a tool, you MUST respond with a JSON object strictly following this schema:\n");
            full_prompt.push_str("```json\n{ \"tool\": \"tool_name\", \"args\": { ... } }\n```\n");
            full_prompt.push_str("Call one tool per reply. When you have the final answer, reply without any tool call.\n");

            full_prompt.push_str("\n## Tool Definitions\n");
            for tool in self.tools.values() {
                // 각 도구의 이름, 설명, 파라미터 스키마를 JSON 형태로 주입
                let schema = serde_json::json!({
                    "name": tool.name(),
                    "description": tool.description(),
                    "parameters": tool.parameters()
                });
                if let Ok(schema_str) = serde_json::to_string_pretty(&schema) {
                    full_prompt.push_str(&format!("{}\n", schema_str));
                }
            }
        }

        // history의 첫 번째 메시지(System Prompt)를 교체하거나 추가
        if let Some(first_msg) = self.history.first_mut() {
            if first_msg.role == "system" {
                first_msg.content = full_prompt;
                return;
            }
        }

        self.history.insert(0, Message::system(full_prompt));
    }

    /// ReAct 루프가 적용된 Chat 메서드
    pub fn chat(&mut self, user_input: &str) -> Result<String> {
        // 1. 사용자 입력 저장
        self.history.push(Message::user(user_input));

        let mut current_turn = 0;

        loop {
            current_turn += 1;
            if current_turn > self.max_turns {
                tracing::warn!(agent = %self.name, limit = self.max_turns, "turn limit reached");
                return Err(RcaError::MaxTurnsExceeded {
                    limit: self.max_turns,
                });
            }

            // 2. LLM 생성
            tracing::debug!(agent = %self.name, turn = current_turn, "requesting model reply");
            let response_text = self.model.generate(&self.history)?;

            // 3. LLM 응답 저장 (Assistant 메시지)
            self.history.push(Message::assistant(response_text.clone()));

            // 4. 도구 호출 감지 (JSON 파싱)
            let Some(tool_call) = extract_tool_call(&response_text) else {
                // 도구 호출이 없으면 최종 답변으로 간주하고 루프 종료
                return Ok(response_text);
            };

            tracing::info!(tool = %tool_call.tool_name, args = %tool_call.args, "tool call");

            // 5. 도구 실행
            let tool_output = self.execute_tool(&tool_call.tool_name, tool_call.args);

            // 6. 실행 결과를 관찰(Observation)로 저장 (user 역할로 컨텍스트 전달)
            let observation_msg = format!(
                "Tag: <tool_output>\nTool: {}\nResult: {}\n</tool_output>\n(Please continue using this result.)",
                tool_call.tool_name, tool_output
            );
            self.history.push(Message::user(observation_msg));
        }
    }

    fn execute_tool(&self, name: &str, args: Value) -> String {
        match self.tools.get(name) {
            Some(tool) => match tool.execute(args) {
                Ok(output) => output,
                Err(e) => format!("Error executing tool: {}", e),
            },
            None => format!("Error: Tool '{}' not found.", name),
        }
    }
}

impl AgentBuilder {
    /// Add a tool before building the agent.
    pub fn with_tool(mut self, tool: impl Tool + 'static) -> Self {
        self.tools.push(Box::new(tool));
        self
    }

    pub fn max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = max_turns;
        self
    }

    /// Finalize and construct the agent.
    pub fn build(self) -> Agent {
        let mut agent = Agent::new(&self.name, self.model, &self.system_prompt);
        agent.max_turns = self.max_turns;
        for tool in self.tools {
            agent.register_tool_box(tool);
        }
        agent
    }
}

// 내부적으로만 쓸 구조체
#[derive(Debug)]
struct ToolCallInfo {
    tool_name: String,
    args: Value,
}

/// 도구 호출 정보 추출
fn extract_tool_call(text: &str) -> Option<ToolCallInfo> {
    // 1) 먼저 ```json { ... } ``` 패턴을 시도해 봅니다 (우선순위)
    if let Ok(re) = Regex::new(r"```(?:json)?\s*(\{[\s\S]*?\})\s*```") {
        for caps in re.captures_iter(text) {
            if let Some(call) = caps.get(1).and_then(|m| parse_tool_call(m.as_str())) {
                return Some(call);
            }
        }
    }

    // 2) 코드펜스가 없을 때: 텍스트 내의 JSON 객체들을 탐색하여 파싱 가능한 것 찾기
    //    중첩 중괄호를 수동으로 추적하여 균형잡힌 JSON 블록을 추출합니다.
    let bytes = text.as_bytes();
    for start in 0..bytes.len() {
        if bytes[start] != b'{' {
            continue;
        }

        let mut depth: i32 = 0;
        for end in start..bytes.len() {
            match bytes[end] {
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        // 후보 문자열
                        if let Some(call) = text.get(start..=end).and_then(parse_tool_call) {
                            return Some(call);
                        }
                        break;
                    }
                }
                _ => {}
            }
        }
    }

    None
}

fn parse_tool_call(candidate: &str) -> Option<ToolCallInfo> {
    // 모델이 trailing comma 등을 섞어 보낼 때는 json5로 한 번 더 시도
    let parsed = serde_json::from_str::<Value>(candidate)
        .ok()
        .or_else(|| json5::from_str::<Value>(candidate).ok())?;

    let tool_name = parsed.get("tool").and_then(|v| v.as_str())?;
    let args = parsed.get("args").cloned().unwrap_or(Value::Null);
    Some(ToolCallInfo {
        tool_name: tool_name.to_string(),
        args,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fenced_tool_call_is_detected() {
        let text = "Let me look.\n```json\n{ \"tool\": \"get_schema\", \"args\": { \"parquet_files\": [\"logs.parquet\"] } }\n```";
        let call = extract_tool_call(text).unwrap();
        assert_eq!(call.tool_name, "get_schema");
        assert_eq!(call.args, json!({"parquet_files": ["logs.parquet"]}));
    }

    #[test]
    fn bare_tool_call_is_detected() {
        let text = r#"I will query. {"tool": "query_parquet_files", "args": {"parquet_files": "a.parquet", "query": "SELECT 1"}}"#;
        let call = extract_tool_call(text).unwrap();
        assert_eq!(call.tool_name, "query_parquet_files");
        assert_eq!(call.args["query"], "SELECT 1");
    }

    #[test]
    fn lenient_json_is_accepted() {
        let text = "```json\n{ tool: 'list_tables_in_directory', args: { directory: '.', }, }\n```";
        let call = extract_tool_call(text).unwrap();
        assert_eq!(call.tool_name, "list_tables_in_directory");
        assert_eq!(call.args["directory"], ".");
    }

    #[test]
    fn plain_answer_has_no_tool_call() {
        assert!(extract_tool_call("Root cause service: ts-food-service").is_none());
        assert!(extract_tool_call("counts: {\"a\": 1}").is_none());
    }

    #[test]
    fn missing_args_default_to_null() {
        let call = extract_tool_call(r#"{"tool": "list_tables_in_directory"}"#).unwrap();
        assert_eq!(call.args, Value::Null);
    }
}
