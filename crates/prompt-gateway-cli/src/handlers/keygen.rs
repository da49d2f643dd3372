//! Keygen command handler.

use prompt_gateway_core::{KeyEntry, generate_api_key};
use prompt_gateway_core::settings::ENV_API_KEYS;

use crate::error::CliError;

/// Execute the keygen command.
pub fn execute(length: usize, apps: &[String]) -> Result<(), CliError> {
    let entries = generate_entries(length, apps);
    print!("{}", render(&entries)?);
    Ok(())
}

fn generate_entries(length: usize, apps: &[String]) -> Vec<KeyEntry> {
    apps.iter()
        .map(|app| app.trim())
        .filter(|app| !app.is_empty())
        .map(|app| KeyEntry {
            appname: app.to_string(),
            key: generate_api_key(length),
        })
        .collect()
}

fn render(entries: &[KeyEntry]) -> Result<String, CliError> {
    let json = serde_json::to_string(entries).map_err(|e| CliError::Output(e.to_string()))?;
    let mut out = String::new();

    out.push_str("Generated API keys:\n");
    for entry in entries {
        out.push_str(&format!("  {}: {}\n", entry.appname, entry.key));
    }

    out.push_str("\nAdd this line to your .env file:\n");
    out.push_str(&format!("{ENV_API_KEYS}={json}\n"));
    out.push_str("\nOr export it in your shell:\n");
    out.push_str(&format!("export {ENV_API_KEYS}='{json}'\n"));

    if let Some(first) = entries.first() {
        out.push_str("\nClients authenticate with the header:\n");
        out.push_str(&format!("Authorization: Bearer {}\n", first.key));
        out.push_str("\nExample request:\n");
        out.push_str("curl -X POST \"http://your-server:5000/query\" \\\n");
        out.push_str("  -H \"Content-Type: application/json\" \\\n");
        out.push_str(&format!("  -H \"Authorization: Bearer {}\" \\\n", first.key));
        out.push_str("  -d '{\"query\": \"Hello, how are you?\"}'\n");
    }

    out.push_str("\nKeep these keys secret, give each application its own key,\n");
    out.push_str("and rotate a key by replacing its entry and restarting the server.\n");
    Ok(out)
}
