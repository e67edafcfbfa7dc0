//! Channel and membership mode flags
//!
//! Simple channel modes live in a [`ChannelModes`] bit set. Modes carrying a
//! value (`k` key, `l` limit, `b` ban list) are stored on the channel itself
//! and only parsed here.

use bitflags::bitflags;

bitflags! {
    /// Channel flags without parameters
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ChannelModes: u8 {
        /// +i invite only
        const INVITE_ONLY = 1 << 0;
        /// +m moderated, only operators and voiced members may speak
        const MODERATED = 1 << 1;
        /// +n no messages from outside the channel
        const NO_EXTERNAL = 1 << 2;
        /// +s secret, hidden from non-members
        const SECRET = 1 << 3;
        /// +t topic settable by operators only
        const TOPIC_LOCK = 1 << 4;
    }
}

bitflags! {
    /// Per-member privileges
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MemberModes: u8 {
        /// +o channel operator
        const OPERATOR = 1 << 0;
        /// +v voice
        const VOICE = 1 << 1;
    }
}

/// Letter order used when rendering channel flags
const CHANNEL_FLAG_LETTERS: [(char, ChannelModes); 5] = [
    ('i', ChannelModes::INVITE_ONLY),
    ('m', ChannelModes::MODERATED),
    ('n', ChannelModes::NO_EXTERNAL),
    ('s', ChannelModes::SECRET),
    ('t', ChannelModes::TOPIC_LOCK),
];

impl ChannelModes {
    /// Modes a freshly created channel starts with
    pub fn new_channel_defaults() -> Self {
        ChannelModes::NO_EXTERNAL | ChannelModes::TOPIC_LOCK
    }

    /// Map a mode letter to its flag
    pub fn from_char(c: char) -> Option<Self> {
        CHANNEL_FLAG_LETTERS
            .iter()
            .find(|(letter, _)| *letter == c)
            .map(|(_, flag)| *flag)
    }

    /// Flag letters in canonical order, without the leading `+`
    pub fn letters(&self) -> String {
        CHANNEL_FLAG_LETTERS
            .iter()
            .filter(|(_, flag)| self.contains(*flag))
            .map(|(letter, _)| *letter)
            .collect()
    }
}

impl MemberModes {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'o' => Some(MemberModes::OPERATOR),
            'v' => Some(MemberModes::VOICE),
            _ => None,
        }
    }

    /// Highest NAMES prefix for this member (`@`, `+` or nothing)
    pub fn prefix(&self) -> &'static str {
        if self.contains(MemberModes::OPERATOR) {
            "@"
        } else if self.contains(MemberModes::VOICE) {
            "+"
        } else {
            ""
        }
    }

    pub fn is_operator(&self) -> bool {
        self.contains(MemberModes::OPERATOR)
    }

    /// Operators and voiced members may speak in a moderated channel
    pub fn can_speak_moderated(&self) -> bool {
        self.intersects(MemberModes::OPERATOR | MemberModes::VOICE)
    }
}

/// One `+x`/`-x` item of a MODE request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeChange {
    /// true for `+`, false for `-`
    pub adding: bool,
    pub mode: char,
    pub param: Option<String>,
}

/// Split a mode string and its arguments into individual changes.
///
/// `o`, `v`, `b` and `k` consume an argument when one is left; `l` consumes
/// one only when being set. Unknown letters are returned as-is without an
/// argument so the caller can report them.
pub fn parse_mode_changes(mode_str: &str, args: &[String]) -> Vec<ModeChange> {
    let mut changes = Vec::new();
    let mut adding = true;
    let mut args = args.iter();

    for c in mode_str.chars() {
        match c {
            '+' => adding = true,
            '-' => adding = false,
            'o' | 'v' | 'b' | 'k' => changes.push(ModeChange {
                adding,
                mode: c,
                param: args.next().cloned(),
            }),
            'l' => changes.push(ModeChange {
                adding,
                mode: c,
                param: if adding { args.next().cloned() } else { None },
            }),
            _ => changes.push(ModeChange {
                adding,
                mode: c,
                param: None,
            }),
        }
    }

    changes
}

/// Render applied changes back into a mode string and its arguments,
/// e.g. `+o-m` with `["bob"]`
pub fn format_mode_changes(changes: &[ModeChange]) -> (String, Vec<String>) {
    let mut modes = String::new();
    let mut args = Vec::new();
    let mut current = None;

    for change in changes {
        if current != Some(change.adding) {
            modes.push(if change.adding { '+' } else { '-' });
            current = Some(change.adding);
        }
        modes.push(change.mode);
        if let Some(ref param) = change.param {
            args.push(param.clone());
        }
    }

    (modes, args)
}
