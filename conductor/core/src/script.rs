//! Build Script Requests
//!
//! Builds the script-generation request for an [`OsConcept`] and cleans up the
//! reply. The numbered constraints below are instructions to the model; the
//! returned text is not checked against them.

use std::sync::OnceLock;

use regex::Regex;

use crate::backend::LlmRequest;
use crate::concept::OsConcept;
use crate::error::GenerationError;

/// Default sampling temperature for script generation
pub const SCRIPT_TEMPERATURE: f32 = 0.4;

/// System instruction for the script call
pub const SCRIPT_SYSTEM_INSTRUCTION: &str = "You are a senior Linux systems engineer. Your task is to \
generate a real, high-level shell script to set up a custom Linux environment based on a provided JSON \
specification. The script should be based on a common base distribution (like Debian/Ubuntu, using apt). \
It is for educational purposes and for advanced users who understand the risks. It is intended to be run \
in a safe, isolated environment like a VM or container.";

/// Build the user prompt for script generation
///
/// # Errors
///
/// Returns an error if the concept cannot be serialized.
pub fn script_prompt(concept: &OsConcept) -> Result<String, serde_json::Error> {
    let concept_json = serde_json::to_string_pretty(concept)?;

    Ok(format!(
        "Based on the following OS concept, generate a bash script that automates the setup.\n\n\
         OS Concept:\n{concept_json}\n\n\
         The script MUST:\n\
         1. Start with `#!/bin/bash` and `set -e` to exit on error.\n\
         2. Include a prominent comment block at the top, warning the user that this is an automated \
         script that will install software and modify system configuration, and should ONLY be run in a \
         dedicated VM or container by an advanced user who understands the commands.\n\
         3. Use `apt-get` for package management, assuming a Debian/Ubuntu base.\n\
         4. Start by running `apt-get update`.\n\
         5. Install necessary dependencies like `build-essential`, `git`, etc.\n\
         6. Install the specified desktop environment ({desktop}) and default packages ({packages}) using \
         `apt-get install -y`. Handle cases where the desktop environment might be a specific name not in \
         the default repos by searching for a close equivalent (e.g., if \"Hyprland\" is specified, install \
         hyprland).\n\
         7. Use `echo` to print progress messages for each major step.\n\
         8. Reference details from the OS concept where appropriate.\n\
         9. NOT perform any destructive actions like partitioning disks (`fdisk`, `mkfs`), or rebooting the \
         system. It should assume it's running on an existing base installation.\n\
         10. Conclude with an echo message telling the user that the script has finished and what they \
         might want to do next (e.g., \"Setup complete. Please reboot or configure your dotfiles.\").\n\
         11. The entire output must be a single block of shell script code.",
        desktop = concept.desktop_environment,
        packages = concept.default_packages.join(", "),
    ))
}

/// Build the complete script request
///
/// # Errors
///
/// Returns an error if the concept cannot be serialized.
pub fn build_script_request(
    concept: &OsConcept,
    model: &str,
    temperature: f32,
) -> Result<LlmRequest, serde_json::Error> {
    Ok(LlmRequest::new(script_prompt(concept)?, model)
        .with_system(SCRIPT_SYSTEM_INSTRUCTION)
        .with_temperature(temperature))
}

fn opening_fence() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^```[\w+.-]*[ \t]*$").expect("valid fence pattern"))
}

/// Remove a leading fence-opener line and a trailing fence-closer line
#[must_use]
pub fn strip_code_fence(raw: &str) -> &str {
    let mut text = raw.trim();

    let (first, rest) = text.split_once('\n').unwrap_or((text, ""));
    if opening_fence().is_match(first.trim_end_matches('\r')) {
        text = rest;
    }

    let (body, last) = text.rsplit_once('\n').unwrap_or(("", text));
    if last.trim() == "```" {
        text = body;
    }

    text.trim()
}

/// Clean up the service's reply into a runnable-looking script
///
/// # Errors
///
/// Returns [`GenerationError::EmptyScript`] if nothing is left after fence
/// stripping.
pub fn parse_script(raw: &str) -> Result<String, GenerationError> {
    let script = strip_code_fence(raw);
    if script.is_empty() {
        return Err(GenerationError::EmptyScript);
    }
    Ok(script.to_string())
}
