//! System prompt building

use tracing::debug;

/// Build an agent's system prompt from its display name and instructions
pub fn build_system_prompt(name: &str, instructions: &str) -> String {
    let mut prompt = String::new();

    if !name.is_empty() {
        prompt.push_str("# ROLE\n\n");
        prompt.push_str(name);
        prompt.push_str("\n\n");
    }

    prompt.push_str("# CURRENT TIME\n\n");
    prompt.push_str(&chrono::Utc::now().to_rfc3339());
    prompt.push_str("\n\n");

    prompt.push_str("# INSTRUCTIONS\n\n");
    prompt.push_str(instructions.trim());
    prompt.push('\n');

    debug!("Built system prompt for '{}' ({} chars)", name, prompt.len());

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_system_prompt() {
        let prompt = build_system_prompt("Inventory Agent", "Watch the reorder points.");
        assert!(prompt.contains("# ROLE\n\nInventory Agent"));
        assert!(prompt.contains("# CURRENT TIME"));
        assert!(prompt.ends_with("Watch the reorder points.\n"));
    }

    #[test]
    fn test_section_order() {
        let prompt = build_system_prompt("HR Agent", "Be discreet.");
        let role = prompt.find("ROLE").unwrap();
        let time = prompt.find("CURRENT TIME").unwrap();
        let instructions = prompt.find("INSTRUCTIONS").unwrap();
        assert!(role < time);
        assert!(time < instructions);
    }

    #[test]
    fn test_nameless_prompt_skips_role() {
        let prompt = build_system_prompt("", "  Answer briefly.  ");
        assert!(!prompt.contains("ROLE"));
        assert!(prompt.contains("Answer briefly.\n"));
    }
}
