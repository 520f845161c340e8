//! Configuration for the chat front end.
//!
//! A plain struct, set once at startup and treated as immutable afterwards.
//! No config-file parsing dependencies are introduced — values come from
//! defaults and environment variables.

use std::time::Duration;

/// Instructional text steering the model. Static configuration; included as
/// the System message of every cycle.
pub const SYSTEM_PROMPT: &str = "You are a Pokémon Battle Expert and Team Building Specialist. \
You help trainers build competitive teams and analyze battle strategies using grounded data \
from the connected battle tools.\n\n\
Your capabilities include:\n\
1. Type Analysis: calculate effectiveness of moves and analyze defensive/offensive coverage\n\
2. Team Building: create balanced teams considering type synergies, roles, and common threats\n\
3. Battle Analysis: predict matchup outcomes and suggest counters\n\
4. Pokémon Data: access detailed information about Pokémon, their moves, and abilities\n\n\
Tool usage: combine multiple tools when needed for comprehensive analysis, and always \
cross-reference findings between tools for accuracy. When responding, explain your reasoning, \
break type-effectiveness calculations down clearly, and consider competitive viability.";

/// Static welcome/capabilities text sent once per connection.
pub const WELCOME_MESSAGE: &str = "Welcome to the Pokémon Team Builder and Battle Analyst!\n\n\
I can help you with:\n\
• Building competitive teams\n\
• Analyzing type matchups\n\
• Checking move effectiveness\n\
• Predicting battle outcomes\n\
• Finding counters to specific Pokémon\n\n\
Try asking me things like:\n\
\"Build a rain team around Pelipper\"\n\
\"Check the effectiveness of Fire moves against Ferrothorn\"\n\
\"Suggest counters to Dragapult\"\n\n\
What would you like help with today?";

const DEFAULT_MODEL: &str = "gpt-4o";
const DEFAULT_TOOL_HOST: &str = "http://localhost:8050";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Process-wide configuration for the chat server, read once at startup.
#[derive(Clone, Debug)]
pub struct ChatConfig {
    /// Model identifier injected into every model request.
    pub model: String,
    /// System prompt prepended to every cycle.
    pub system_prompt: String,
    /// Welcome text sent once per connection.
    pub welcome_message: String,
    /// API key for the model endpoint.
    pub api_key: String,
    /// Optional OpenAI-compatible base URL override.
    pub api_base_url: Option<String>,
    /// Base URL of the tool host.
    pub tool_host_url: String,
    /// Upper bound for each external call (model and tool host).
    pub request_timeout: Duration,
    /// Address the chat server binds to.
    pub bind_addr: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            system_prompt: SYSTEM_PROMPT.to_string(),
            welcome_message: WELCOME_MESSAGE.to_string(),
            api_key: String::new(),
            api_base_url: None,
            tool_host_url: DEFAULT_TOOL_HOST.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
        }
    }
}

impl ChatConfig {
    /// Build a config from the environment:
    ///
    /// - `OPEN_AI_SECRET` — model API key (required to talk to a real model)
    /// - `OPENAI_BASE_URL` — optional endpoint override
    /// - `POKECHAT_MODEL` — model identifier
    /// - `POKECHAT_TOOL_HOST` — tool host base URL
    /// - `POKECHAT_BIND` — chat server bind address
    /// - `POKECHAT_TIMEOUT_SECS` — external call timeout
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(key) = std::env::var("OPEN_AI_SECRET") {
            config.api_key = key;
        }
        if let Ok(url) = std::env::var("OPENAI_BASE_URL") {
            config.api_base_url = Some(url);
        }
        if let Ok(model) = std::env::var("POKECHAT_MODEL") {
            config.model = model;
        }
        if let Ok(host) = std::env::var("POKECHAT_TOOL_HOST") {
            config.tool_host_url = host;
        }
        if let Ok(addr) = std::env::var("POKECHAT_BIND") {
            config.bind_addr = addr;
        }
        if let Ok(secs) = std::env::var("POKECHAT_TIMEOUT_SECS") {
            if let Ok(secs) = secs.parse::<u64>() {
                config.request_timeout = Duration::from_secs(secs);
            }
        }
        config
    }
}
