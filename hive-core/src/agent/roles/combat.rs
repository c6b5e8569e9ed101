use async_trait::async_trait;
use serde_json::{json, Value};

use super::{fold_hash, now, slug};
use crate::agent::{ActionContext, AgentAction, Handled, Role};
use crate::error::Result;

pub const ID: &str = "combat";
pub const RANK: u32 = 6;

/// Combatant stats used when no balance pass has run yet
const DEFAULT_HP: u64 = 30;
const DEFAULT_DAMAGE: u64 = 6;
const DEFAULT_ARMOR: u64 = 1;
const MAX_ROUNDS: u64 = 50;

/// Combat-math balancer and encounter simulator
pub struct Combat;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Stats {
    hp: u64,
    damage: u64,
    armor: u64,
}

impl Stats {
    fn from_value(value: &Value) -> Option<Self> {
        Some(Self {
            hp: value.get("hp")?.as_u64()?,
            damage: value.get("damage")?.as_u64()?,
            armor: value.get("armor")?.as_u64()?,
        })
    }

    /// Stats seeded from a name so the same combatant always matches
    fn for_name(name: &str, base: Stats) -> Self {
        let h = fold_hash(name);
        Self {
            hp: base.hp + h % 11,
            damage: base.damage + (h >> 8) % 4,
            armor: base.armor + (h >> 16) % 3,
        }
    }

    fn hit(&self, defender: &Stats) -> u64 {
        self.damage.saturating_sub(defender.armor).max(1)
    }
}

/// Rounds each side needs to drop the other: (attacker, defender)
fn duel(attacker: Stats, defender: Stats) -> (u64, u64) {
    let rounds_to_kill = |hp: u64, hit: u64| ((hp + hit - 1) / hit).min(MAX_ROUNDS);
    (
        rounds_to_kill(defender.hp, attacker.hit(&defender)),
        rounds_to_kill(attacker.hp, defender.hit(&attacker)),
    )
}

#[async_trait]
impl Role for Combat {
    fn id(&self) -> &str {
        ID
    }

    fn rank(&self) -> u32 {
        RANK
    }

    fn actions(&self) -> &'static [&'static str] {
        &["balance_combat", "simulate_encounter"]
    }

    async fn perform(&self, action: AgentAction, ctx: &mut ActionContext<'_>) -> Result<Handled> {
        match action {
            AgentAction::BalanceCombat { objective } => {
                let h = fold_hash(&objective);
                let mechanics = &mut ctx.knowledge().mechanics;
                let revision = mechanics
                    .get("balance")
                    .and_then(|b| b.get("revision"))
                    .and_then(Value::as_u64)
                    .unwrap_or(0)
                    + 1;
                mechanics.insert(
                    "balance".into(),
                    json!({
                        "objective": objective,
                        "hp": DEFAULT_HP + h % 21,
                        "damage": DEFAULT_DAMAGE + (h >> 8) % 5,
                        "armor": DEFAULT_ARMOR + (h >> 16) % 3,
                        "crit_chance": 0.05,
                        "revision": revision,
                        "balanced_at": now(),
                    }),
                );
                Ok(Handled::Done)
            }
            AgentAction::SimulateEncounter { attacker, defender } => {
                let attacker = attacker.unwrap_or_else(|| "adventurer".into());
                let defender = defender.unwrap_or_else(|| "goblin".into());

                let knowledge = ctx.knowledge();
                let base = knowledge
                    .mechanics
                    .get("balance")
                    .and_then(Stats::from_value)
                    .unwrap_or(Stats {
                        hp: DEFAULT_HP,
                        damage: DEFAULT_DAMAGE,
                        armor: DEFAULT_ARMOR,
                    });

                let a = Stats::for_name(&attacker, base);
                let d = Stats::for_name(&defender, base);
                let (attacker_rounds, defender_rounds) = duel(a, d);
                // 同回合时先手方获胜
                let winner = if attacker_rounds <= defender_rounds {
                    &attacker
                } else {
                    &defender
                };

                let key = format!("encounter:{}-vs-{}", slug(&attacker), slug(&defender));
                let record = json!({
                    "attacker": attacker,
                    "defender": defender,
                    "rounds": attacker_rounds.min(defender_rounds),
                    "winner": winner,
                    "simulated_at": now(),
                });
                knowledge.projects.insert(key, record);
                Ok(Handled::Done)
            }
            _ => Ok(Handled::Unsupported),
        }
    }
}
