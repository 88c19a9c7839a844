/// Gaia Tappy game state definitions.

/// Models that can be bought with Gaia Points.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UpgradeKind {
    Qwen,
    Gemma,
    Llama,
}

impl UpgradeKind {
    /// All upgrades in catalog order.
    pub fn all() -> &'static [UpgradeKind] {
        &[UpgradeKind::Qwen, UpgradeKind::Gemma, UpgradeKind::Llama]
    }

    /// Display name.
    pub fn name(&self) -> &'static str {
        match self {
            UpgradeKind::Qwen => "Qwen",
            UpgradeKind::Gemma => "Gemma",
            UpgradeKind::Llama => "Llama",
        }
    }

    /// Price in Gaia Points.
    pub fn cost(&self) -> u64 {
        match self {
            UpgradeKind::Qwen => 20,
            UpgradeKind::Gemma => 60,
            UpgradeKind::Llama => 800,
        }
    }

    /// Tap multiplier granted while owned.
    pub fn multiplier(&self) -> u64 {
        match self {
            UpgradeKind::Qwen => 2,
            UpgradeKind::Gemma => 10,
            UpgradeKind::Llama => 50,
        }
    }

    /// Key to buy (1-3 mapped to catalog index).
    pub fn key(&self) -> char {
        match self {
            UpgradeKind::Qwen => '1',
            UpgradeKind::Gemma => '2',
            UpgradeKind::Llama => '3',
        }
    }

    pub fn index(&self) -> usize {
        match self {
            UpgradeKind::Qwen => 0,
            UpgradeKind::Gemma => 1,
            UpgradeKind::Llama => 2,
        }
    }

    pub fn from_index(idx: usize) -> Option<UpgradeKind> {
        Self::all().get(idx).copied()
    }
}

/// Upgrades bought so far, in purchase order. Never shrinks.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OwnedUpgrades {
    kinds: Vec<UpgradeKind>,
}

impl OwnedUpgrades {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, kind: UpgradeKind) -> bool {
        self.kinds.contains(&kind)
    }

    /// Record a purchase. Returns false if it was already owned.
    pub fn insert(&mut self, kind: UpgradeKind) -> bool {
        if self.contains(kind) {
            return false;
        }
        self.kinds.push(kind);
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = UpgradeKind> + '_ {
        self.kinds.iter().copied()
    }
}

/// Whether the round clock is still counting down.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundPhase {
    Running,
    Ended,
}

/// Result of a purchase request, shown to the player as a notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PurchaseOutcome {
    Purchased,
    AlreadyOwned,
    InsufficientPoints { cost: u64 },
}

/// A transient "+" marker spawned by a manual tap.
///
/// Offsets are in the same pixel-ish units the button art is laid out in:
/// `x` in -20..20, `y` in -79..=-30 (above the button).
#[derive(Clone, Debug, PartialEq)]
pub struct TapEffect {
    pub id: u64,
    pub x: i16,
    pub y: i16,
}

/// Notification log entry.
#[derive(Clone, Debug)]
pub struct LogEntry {
    pub text: String,
    pub is_important: bool,
}

/// Maximum log lines kept.
const MAX_LOG: usize = 50;

/// Full state of one Gaia Tappy session.
pub struct TappyState {
    /// Seconds left in the current round.
    pub time_remaining: u32,
    /// Throughputs collected toward the next Gaia Point.
    pub accumulator: f64,
    /// Gaia Points.
    pub points: u64,
    /// "Call Amir" already used this round.
    pub power_up_used: bool,
    /// Models bought. Survives round resets.
    pub owned: OwnedUpgrades,
    /// Best completed round.
    pub high_score: u64,
    /// Tap effects emitted since the presentation layer last drained them.
    pub pending_effects: Vec<TapEffect>,
    /// Next tap effect id.
    pub next_effect_id: u64,
    /// Completed rounds this session.
    pub rounds_played: u32,
    /// Message log.
    pub log: Vec<LogEntry>,
    /// Simple RNG state for effect offsets.
    pub rng_state: u32,
}

impl TappyState {
    pub fn new(round_seconds: u32) -> Self {
        Self {
            time_remaining: round_seconds,
            accumulator: 0.0,
            points: 0,
            power_up_used: false,
            owned: OwnedUpgrades::new(),
            high_score: 0,
            pending_effects: Vec::new(),
            next_effect_id: 0,
            rounds_played: 0,
            log: vec![LogEntry {
                text: "Welcome to Gaia Tappy! Run your node.".into(),
                is_important: true,
            }],
            rng_state: 42,
        }
    }

    pub fn phase(&self) -> RoundPhase {
        if self.time_remaining > 0 {
            RoundPhase::Running
        } else {
            RoundPhase::Ended
        }
    }

    pub fn is_running(&self) -> bool {
        self.phase() == RoundPhase::Running
    }

    pub fn add_log(&mut self, text: &str, is_important: bool) {
        self.log.push(LogEntry {
            text: text.to_string(),
            is_important,
        });
        if self.log.len() > MAX_LOG {
            self.log.remove(0);
        }
    }

    /// xorshift32.
    pub fn next_random(&mut self) -> u32 {
        let mut x = self.rng_state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.rng_state = x;
        x
    }
}
