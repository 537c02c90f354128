//! OS Concept Requests
//!
//! Builds the concept-generation request (prompt, system instruction and
//! structured-output schema) and parses the service's JSON reply into an
//! [`OsConcept`].
//!
//! The schema marks all nine fields as required. A response missing any of
//! them is a parse failure; nothing is defaulted locally.

use serde::{Deserialize, Serialize};

use crate::backend::LlmRequest;
use crate::digest::FileSnippet;
use crate::error::GenerationError;

/// Default sampling temperature for concept generation
pub const CONCEPT_TEMPERATURE: f32 = 0.8;

/// System instruction for the concept call
pub const CONCEPT_SYSTEM_INSTRUCTION: &str = "You are an expert systems architect and creative OS designer. \
Your task is to conceptualize a new Linux-based operating system based on a user's prompt and a list of \
provided filenames/content. You must generate a detailed, structured concept in JSON format. Your response \
MUST strictly adhere to the provided JSON schema. Be creative, thematic, and plausible.";

/// A generated operating system concept
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OsConcept {
    /// Creative, unique name for the OS
    pub os_name: String,
    /// Internal codename for the release
    pub codename: String,
    /// Short paragraph on purpose and design principles
    pub philosophy: String,
    /// Plausible Linux kernel version
    pub kernel_version: String,
    /// Default desktop environment or window manager
    pub desktop_environment: String,
    /// Default command-line shell
    pub default_shell: String,
    /// Standout features, in display order
    pub key_features: Vec<String>,
    /// Pre-installed packages, in display order
    pub default_packages: Vec<String>,
    /// Multi-line ASCII art shown at boot
    pub boot_screen_ascii: String,
}

/// The JSON schema the concept response must match
#[must_use]
pub fn concept_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "osName": {
                "type": "string",
                "description": "A creative, unique name for the OS."
            },
            "codename": {
                "type": "string",
                "description": "A cool, internal codename for the OS version."
            },
            "philosophy": {
                "type": "string",
                "description": "A short paragraph explaining the OS's core purpose and design principles."
            },
            "kernelVersion": {
                "type": "string",
                "description": "A plausible Linux kernel version, e.g., 'Linux Kernel 6.9'."
            },
            "desktopEnvironment": {
                "type": "string",
                "description": "The default desktop environment or window manager, e.g., 'Custom Tiling Window Manager based on Hyprland'."
            },
            "defaultShell": {
                "type": "string",
                "description": "The default command-line shell, e.g., 'Zsh with Powerlevel10k'."
            },
            "keyFeatures": {
                "type": "array",
                "items": { "type": "string" },
                "description": "A list of 3-5 key, standout features of the OS."
            },
            "defaultPackages": {
                "type": "array",
                "items": { "type": "string" },
                "description": "A list of essential pre-installed packages/tools based on the OS philosophy and input files."
            },
            "bootScreenAscii": {
                "type": "string",
                "description": "Creative ASCII art for the boot screen, using backslashes for escaping where needed. It must be multiline."
            }
        },
        "required": [
            "osName",
            "codename",
            "philosophy",
            "kernelVersion",
            "desktopEnvironment",
            "defaultShell",
            "keyFeatures",
            "defaultPackages",
            "bootScreenAscii"
        ]
    })
}

/// Render the file section of the prompt
fn file_details(files: &[FileSnippet]) -> String {
    if files.is_empty() {
        return "The user has not provided any files. Rely solely on their prompt.".to_string();
    }

    let listing: Vec<String> = files
        .iter()
        .map(|f| format!("File: {}\nSnippet:\n---\n{}\n---\n", f.name, f.content))
        .collect();

    format!(
        "The user has provided the following files for inspiration. Interpret their purpose \
         from their names and content snippets:\n\n{}",
        listing.join("\n")
    )
}

/// Build the user prompt for concept generation
#[must_use]
pub fn concept_prompt(prompt: &str, files: &[FileSnippet]) -> String {
    format!(
        "User's core idea: \"{prompt}\"\n\n\
         {details}\n\n\
         Based on all this information, generate a complete OS concept. The OS must be based on \
         the Linux kernel. Create a cool, thematic name and a unique codename. The boot screen \
         ASCII art should be creative and relevant to the OS theme.",
        details = file_details(files),
    )
}

/// Build the complete concept request
#[must_use]
pub fn build_concept_request(
    prompt: &str,
    files: &[FileSnippet],
    model: &str,
    temperature: f32,
) -> LlmRequest {
    LlmRequest::new(concept_prompt(prompt, files), model)
        .with_system(CONCEPT_SYSTEM_INSTRUCTION)
        .with_temperature(temperature)
        .with_response_schema(concept_schema())
}

/// Parse the service's reply into a concept
///
/// # Errors
///
/// Returns [`GenerationError::ConceptParse`] if the trimmed text is not JSON
/// of the concept shape.
pub fn parse_concept(raw: &str) -> Result<OsConcept, GenerationError> {
    Ok(serde_json::from_str(raw.trim())?)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// A complete concept as the service would return it
    pub(crate) const SAMPLE_CONCEPT_JSON: &str = r#"{
        "osName": "Quillix",
        "codename": "Inkwell Dawn",
        "philosophy": "A calm, distraction-free system for writers.",
        "kernelVersion": "Linux Kernel 6.9",
        "desktopEnvironment": "Sway",
        "defaultShell": "Fish",
        "keyFeatures": ["Focus mode", "Versioned drafts", "Offline dictionary"],
        "defaultPackages": ["vim", "pandoc", "aspell"],
        "bootScreenAscii": "  ___\n (o o)\n  \\_/"
    }"#;

    #[test]
    fn test_parse_full_concept() {
        let concept = parse_concept(SAMPLE_CONCEPT_JSON).unwrap();
        assert_eq!(concept.os_name, "Quillix");
        assert_eq!(concept.codename, "Inkwell Dawn");
        assert_eq!(
            concept.key_features,
            vec!["Focus mode", "Versioned drafts", "Offline dictionary"]
        );
        assert_eq!(concept.boot_screen_ascii, "  ___\n (o o)\n  \\_/");
    }

    #[test]
    fn test_parse_tolerates_surrounding_whitespace() {
        let raw = format!("\n\n  {SAMPLE_CONCEPT_JSON}  \n");
        assert!(parse_concept(&raw).is_ok());
    }

    #[test]
    fn test_missing_field_is_an_error() {
        let mut value: serde_json::Value = serde_json::from_str(SAMPLE_CONCEPT_JSON).unwrap();
        value.as_object_mut().unwrap().remove("bootScreenAscii");

        let err = parse_concept(&value.to_string()).unwrap_err();
        assert!(matches!(err, GenerationError::ConceptParse(_)));
    }

    #[test]
    fn test_non_json_is_an_error() {
        assert!(parse_concept("Sure! Here is your OS:").is_err());
    }

    #[test]
    fn test_schema_requires_every_field() {
        let schema = concept_schema();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|v| v.as_str())
            .collect();
        let properties = schema["properties"].as_object().unwrap();

        assert_eq!(required.len(), 9);
        for field in &required {
            assert!(properties.contains_key(*field), "missing property {field}");
        }
        assert_eq!(schema["properties"]["keyFeatures"]["type"], "array");
    }

    #[test]
    fn test_prompt_without_files() {
        let prompt = concept_prompt("A minimal OS for writing", &[]);
        assert!(prompt.contains("User's core idea: \"A minimal OS for writing\""));
        assert!(prompt.contains("has not provided any files"));
        assert!(prompt.contains("based on the Linux kernel"));
    }

    #[test]
    fn test_prompt_lists_each_file() {
        let files = vec![
            FileSnippet {
                name: "dotfiles.zsh".to_string(),
                content: "alias ll='ls -la'".to_string(),
            },
            FileSnippet {
                name: "wallpaper.png".to_string(),
                content: "[Binary file content not readable]".to_string(),
            },
        ];

        let prompt = concept_prompt("", &files);
        assert!(prompt.contains("File: dotfiles.zsh\nSnippet:\n---\nalias ll='ls -la'\n---\n"));
        assert!(prompt.contains("File: wallpaper.png"));
        assert!(!prompt.contains("has not provided any files"));
    }

    #[test]
    fn test_request_carries_schema_and_temperature() {
        let request = build_concept_request("idea", &[], "gemini-2.5-flash", CONCEPT_TEMPERATURE);
        assert!(request.wants_json());
        assert_eq!(request.model, "gemini-2.5-flash");
        assert_eq!(request.system.as_deref(), Some(CONCEPT_SYSTEM_INSTRUCTION));
        assert!((request.temperature - 0.8).abs() < f32::EPSILON);
    }
}
