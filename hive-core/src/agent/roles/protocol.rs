//! Protocol: telnet option negotiation and ANSI color themes.

use async_trait::async_trait;
use serde_json::json;

use super::{now, slug, with_section};
use crate::agent::{ActionContext, AgentAction, Handled, Role};
use crate::error::Result;

pub const ID: &str = "protocol";
pub const RANK: u32 = 2;

/// Telnet option names and codes (RFC 857, 858, 1091, 1073, 1184 and MUD extensions)
pub const TELNET_OPTIONS: [(&str, u8); 9] = [
    ("ECHO", 1),
    ("SGA", 3),
    ("TTYPE", 24),
    ("NAWS", 31),
    ("LINEMODE", 34),
    ("MSDP", 69),
    ("MSSP", 70),
    ("MCCP2", 86),
    ("GMCP", 201),
];

/// Options offered when the task names none
const DEFAULT_OFFER: [&str; 5] = ["TTYPE", "NAWS", "MSSP", "MCCP2", "GMCP"];

const IAC: u8 = 255;
const WILL: u8 = 251;

/// ANSI SGR parameters per theme element
static THEMES: [(&str, [(&str, &str); 5]); 2] = [
    (
        "classic",
        [
            ("room_title", "1;36"),
            ("room_exits", "32"),
            ("say", "33"),
            ("tell", "35"),
            ("combat", "31"),
        ],
    ),
    (
        "muted",
        [
            ("room_title", "1;37"),
            ("room_exits", "37"),
            ("say", "37"),
            ("tell", "1;37"),
            ("combat", "1;31"),
        ],
    ),
];

pub struct Protocol;

pub fn telnet_option(name: &str) -> Option<u8> {
    TELNET_OPTIONS
        .iter()
        .find(|(option, _)| option.eq_ignore_ascii_case(name))
        .map(|(_, code)| *code)
}

#[async_trait]
impl Role for Protocol {
    fn id(&self) -> &str {
        ID
    }

    fn rank(&self) -> u32 {
        RANK
    }

    fn actions(&self) -> &'static [&'static str] {
        &["negotiate_protocol", "define_ansi_theme"]
    }

    async fn perform(&self, action: AgentAction, ctx: &mut ActionContext<'_>) -> Result<Handled> {
        match action {
            AgentAction::NegotiateProtocol { options } => {
                let requested = options
                    .unwrap_or_else(|| DEFAULT_OFFER.iter().map(|s| s.to_string()).collect());

                let mut offered = Vec::new();
                let mut rejected = Vec::new();
                for name in requested {
                    match telnet_option(&name) {
                        Some(code) => offered.push(json!({
                            "option": name.to_ascii_uppercase(),
                            "code": code,
                            "offer": [IAC, WILL, code],
                        })),
                        None => rejected.push(name),
                    }
                }

                ctx.knowledge().mechanics.insert(
                    "telnet".into(),
                    json!({
                        "offered": offered,
                        "rejected": rejected,
                        "negotiated_at": now(),
                    }),
                );
                Ok(Handled::Done)
            }
            AgentAction::DefineAnsiTheme { name } => {
                let name = name.map(|n| slug(&n)).unwrap_or_else(|| "classic".into());
                let palette = THEMES
                    .iter()
                    .find(|(theme, _)| *theme == name)
                    .map(|(_, palette)| palette)
                    .unwrap_or(&THEMES[0].1);

                let mut theme = serde_json::Map::new();
                for (element, sgr) in palette {
                    theme.insert(element.to_string(), json!(format!("\u{1b}[{}m", sgr)));
                }
                theme.insert("reset".into(), json!("\u{1b}[0m"));

                with_section(&mut ctx.knowledge().mechanics, "ansi_themes", |themes| {
                    themes.insert(name, theme.into());
                });
                Ok(Handled::Done)
            }
            _ => Ok(Handled::Unsupported),
        }
    }
}
