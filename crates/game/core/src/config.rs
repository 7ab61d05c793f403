//! Game configuration constants and tunable parameters.
//!
//! Every field has a default so a configuration file only needs to name the
//! values it changes.

/// World-level configuration.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GameConfig {
    /// Chebyshev radius of the square an actor sees around itself.
    pub perception_radius: i32,
    /// Hit points removed by one melee attack.
    pub melee_damage: i32,
    pub ai: AiConfig,
}

impl GameConfig {
    pub const DEFAULT_PERCEPTION_RADIUS: i32 = 6;
    pub const DEFAULT_MELEE_DAMAGE: i32 = 3;

    pub fn new() -> Self {
        Self {
            perception_radius: Self::DEFAULT_PERCEPTION_RADIUS,
            melee_damage: Self::DEFAULT_MELEE_DAMAGE,
            ai: AiConfig::default(),
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Bias tables and goal tuning for every brain role.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AiConfig {
    pub basic: BasicBiases,
    pub spellcaster: SpellcasterBiases,
    pub commander: CommanderBiases,
    pub battle: BattleConfig,
    pub thief: ThiefConfig,
}

/// Biases of the default brain.
///
/// The attack bias of each actor is drawn from `[attack_min, attack_max]`
/// when its brain is built.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BasicBiases {
    pub attack_min: f64,
    pub attack_max: f64,
    pub explore: f64,
    pub flee: f64,
    pub order: f64,
    pub patrol: f64,
    /// Turns a single Explore goal wanders before re-arbitration.
    pub explore_turns: u32,
    /// Turns a single Flee goal runs before re-arbitration.
    pub flee_turns: u32,
}

impl Default for BasicBiases {
    fn default() -> Self {
        Self {
            attack_min: 0.5,
            attack_max: 1.0,
            explore: 0.2,
            flee: 0.2,
            order: 0.7,
            patrol: 1.0,
            explore_turns: 10,
            flee_turns: 5,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SpellcasterBiases {
    pub cast_spell: f64,
    /// Probability that a capable caster considers casting this turn.
    pub cast_probability: f64,
}

impl Default for SpellcasterBiases {
    fn default() -> Self {
        Self {
            cast_spell: 2.0,
            cast_probability: 0.8,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CommanderBiases {
    /// Replaces the randomized attack bias of the basic brain.
    pub attack: f64,
    pub win_battle: f64,
    pub retreat: f64,
    pub retreat_turns: u32,
}

impl Default for CommanderBiases {
    fn default() -> Self {
        Self {
            attack: 0.3,
            win_battle: 1.5,
            retreat: 5.0,
            retreat_turns: 5,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BattleConfig {
    /// Turns between two rounds of movement orders while searching for the enemy.
    pub order_cooldown: u32,
    /// Side length of one cell of the coarse visited-region grid.
    pub macro_cell_size: u32,
    /// Turn budget of one MoveUntilEnemy goal.
    pub move_until_enemy_turns: u32,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            order_cooldown: 50,
            macro_cell_size: 10,
            move_until_enemy_turns: 50,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ThiefConfig {
    pub bias: f64,
    /// Turns before a thief carrying goods heads for a shop again.
    pub shop_cooldown: u32,
    /// Turns between two door visits.
    pub door_cooldown: u32,
    pub explore_turns: u32,
    pub search_time_min: u32,
    pub search_time_max: u32,
}

impl Default for ThiefConfig {
    fn default() -> Self {
        Self {
            bias: 1.0,
            shop_cooldown: 30,
            door_cooldown: 10,
            explore_turns: 8,
            search_time_min: 20,
            search_time_max: 40,
        }
    }
}
