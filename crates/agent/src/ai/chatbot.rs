//! Clinical assistant chat loop with tool calling

use clin_core::{ApiClient, tools};
use serde_json::json;

use super::client::{AgentError, ClaudeClient, Content, ContentBlock, Message, Tool};

const SYSTEM_PROMPT: &str = r#"You are a clinical AI assistant that helps healthcare professionals access patient information. Use the available tools to retrieve patient data; never guess or make up clinical information.

When you receive patient information from tools, always answer with a natural, conversational summary in paragraph form. Never echo raw structured blocks like "PATIENT INFORMATION" back to the user; write a flowing summary such as "John Doe is a 45-year-old male patient with ID 123...".

Search guidelines:
- Given a single name like "Robert854", use only the first_name parameter. Do not split a single name into first_name and last_name unless the user provides both parts.
- Pass each parameter separately: first_name="Maxwell782", never first_name="first_name=Maxwell782" and never several parameters joined into one string.
- Patient identifiers may be an integer ID or a medical record number; pass them through as given."#;

/// Maximum agentic loop iterations to prevent runaway
const MAX_ITERATIONS: u32 = 10;

fn identifier_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "patient_identifier": {
                "type": "string",
                "description": "The patient's integer ID or external identifier (MRN/UUID)"
            }
        },
        "required": ["patient_identifier"],
        "additionalProperties": false
    })
}

/// The tools available to the assistant
fn tool_definitions() -> Vec<Tool> {
    vec![
        Tool {
            name: "get_patient_info".to_string(),
            description: "Get detailed information about a specific patient by ID or identifier"
                .to_string(),
            input_schema: identifier_schema(),
        },
        Tool {
            name: "search_patients".to_string(),
            description: "Search for patients by name, birth date, and gender".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "first_name": {
                        "type": "string",
                        "description": "Patient's first name (partial match), e.g. \"Maxwell782\""
                    },
                    "last_name": {
                        "type": "string",
                        "description": "Patient's last name (partial match), e.g. \"Koepp521\""
                    },
                    "birth_date": {
                        "type": "string",
                        "description": "Birth date in YYYY-MM-DD format"
                    },
                    "gender": {
                        "type": "string",
                        "enum": ["male", "female", "other", "unknown"]
                    },
                    "limit": {
                        "type": "integer",
                        "description": "Maximum number of results (default 20, max 100)"
                    }
                },
                "additionalProperties": false
            }),
        },
        Tool {
            name: "get_patient_conditions".to_string(),
            description: "Get all medical conditions for a specific patient".to_string(),
            input_schema: identifier_schema(),
        },
        Tool {
            name: "get_patient_encounters".to_string(),
            description: "Get all medical encounters for a specific patient".to_string(),
            input_schema: identifier_schema(),
        },
        Tool {
            name: "get_patient_observations".to_string(),
            description: "Get all clinical observations for a specific patient".to_string(),
            input_schema: identifier_schema(),
        },
        Tool {
            name: "get_patient_summary".to_string(),
            description: "Get a comprehensive patient summary: basic info, conditions, \
                          encounters, and observations"
                .to_string(),
            input_schema: identifier_schema(),
        },
        Tool {
            name: "get_encounter_details".to_string(),
            description: "Get detailed information about a specific encounter by its ID"
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "encounter_id": {
                        "type": "string",
                        "description": "The encounter's integer ID"
                    }
                },
                "required": ["encounter_id"],
                "additionalProperties": false
            }),
        },
        Tool {
            name: "search_encounters".to_string(),
            description: "Search encounters by patient, practitioner, organization, status, \
                          date range, and class code"
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "patient_id": {"type": "integer"},
                    "practitioner_id": {"type": "integer"},
                    "organization_id": {"type": "integer"},
                    "status": {
                        "type": "string",
                        "description": "Encounter status, e.g. planned, in-progress, finished"
                    },
                    "start_from": {
                        "type": "string",
                        "description": "Encounters starting on or after this date (YYYY-MM-DD)"
                    },
                    "start_to": {
                        "type": "string",
                        "description": "Encounters starting before this date (YYYY-MM-DD)"
                    },
                    "class_code": {"type": "string"},
                    "limit": {"type": "integer"}
                },
                "additionalProperties": false
            }),
        },
        Tool {
            name: "encounter_statistics".to_string(),
            description: "Get summary statistics about encounters in the system: total \
                          count plus status and class-code breakdowns"
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {},
                "additionalProperties": false
            }),
        },
    ]
}

/// Run the chat loop.
///
/// Sends the user message to Claude with the tool definitions, executes any
/// requested tool calls against the clinical API, and continues until the
/// model produces a final text response or the iteration cap is hit.
pub async fn chat(
    claude: &ClaudeClient,
    api: &ApiClient,
    user_message: &str,
) -> Result<String, AgentError> {
    let tools_available = tool_definitions();

    let mut messages = vec![Message {
        role: "user".to_string(),
        content: Content::Text(user_message.to_string()),
    }];

    for iteration in 0..MAX_ITERATIONS {
        let response = claude
            .send(
                Some(SYSTEM_PROMPT),
                messages.clone(),
                Some(tools_available.clone()),
            )
            .await?;

        tracing::debug!(
            iteration = iteration,
            stop_reason = &response.stop_reason,
            "Chat loop iteration"
        );

        if response.stop_reason != "tool_use" {
            // end_turn, or an unexpected stop reason with usable text
            return claude.extract_text(&response);
        }

        let tool_uses: Vec<_> = response
            .content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::ToolUse { id, name, input } => {
                    Some((id.clone(), name.clone(), input.clone()))
                }
                _ => None,
            })
            .collect();

        // Record the assistant turn, then answer every tool call in one
        // user turn. Tool execution never fails; bad input comes back as
        // explanatory text the model can react to.
        messages.push(Message {
            role: "assistant".to_string(),
            content: Content::Blocks(response.content),
        });

        let mut result_blocks = Vec::new();
        for (tool_id, tool_name, tool_input) in &tool_uses {
            let result = tools::dispatch(api, tool_name, tool_input).await;
            result_blocks.push(ContentBlock::ToolResult {
                tool_use_id: tool_id.clone(),
                content: result,
            });
        }

        messages.push(Message {
            role: "user".to_string(),
            content: Content::Blocks(result_blocks),
        });
    }

    Err(AgentError::MaxIterations(MAX_ITERATIONS))
}
