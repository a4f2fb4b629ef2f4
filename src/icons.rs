use serde::Serialize;
use std::fmt;

/// Payout factor applied to the stake placed on the winning icon.
pub const BET_MULTIPLIER: u64 = 10;

pub const INITIAL_BALANCE: u64 = 5000;

/// Chip denominations offered by the bet selector.
pub const BET_AMOUNTS: [u64; 5] = [10, 50, 100, 500, 1000];

pub const DEFAULT_BET_AMOUNT: u64 = 100;

/// Mock top-up credited by the wallet panel.
pub const GRANT_AMOUNT: u64 = 1000;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize)]
pub struct IconId(&'static str);

impl IconId {
    pub fn as_str(&self) -> &'static str {
        self.0
    }

    /// Resolves a raw id against the fixed icon set.
    pub fn parse(raw: &str) -> Option<IconId> {
        icon(raw).map(|def| def.id)
    }
}

impl fmt::Display for IconId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct IconDef {
    pub id: IconId,
    pub display_name: &'static str,
    pub emoji: &'static str,
    pub description: &'static str,
}

const fn def(
    id: &'static str,
    display_name: &'static str,
    emoji: &'static str,
    description: &'static str,
) -> IconDef {
    IconDef {
        id: IconId(id),
        display_name,
        emoji,
        description,
    }
}

pub const GAME_ICONS: [IconDef; 12] = [
    def("umbrella", "Umbrella", "⛱️", "Royal Protection"),
    def("ball", "Ball", "⚽", "Goal Oriented"),
    def("sun", "Sun", "☀️", "Golden Luck"),
    def("lamp", "Lamp", "🪔", "Enlightenment"),
    def("cow", "Cow", "🐄", "Prosperity"),
    def("bucket", "Bucket", "🪣", "Wealth Reservoir"),
    def("kite", "Kite", "🪁", "High Hopes"),
    def("spinning-top", "Spinning Top", "🧶", "Endless Motion"),
    def("rose", "Rose", "🌹", "Love & Victory"),
    def("butterfly", "Butterfly", "🦋", "Transformation"),
    def("pigeon", "Pigeon", "🐦", "Peace Messenger"),
    def("rabbit", "Rabbit", "🐇", "Speed & Fortune"),
];

pub fn all_icons() -> &'static [IconDef] {
    &GAME_ICONS
}

pub fn icon(id: &str) -> Option<&'static IconDef> {
    GAME_ICONS.iter().find(|def| def.id.as_str() == id)
}

pub fn icon_def(id: IconId) -> &'static IconDef {
    // IconId can only be built from GAME_ICONS entries
    GAME_ICONS
        .iter()
        .find(|def| def.id == id)
        .unwrap_or(&GAME_ICONS[0])
}

pub fn icon_index(id: IconId) -> usize {
    GAME_ICONS
        .iter()
        .position(|def| def.id == id)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn game_icons__has_twelve_unique_ids() {
        // when
        let ids: HashSet<_> = GAME_ICONS.iter().map(|d| d.id).collect();

        // then
        assert_eq!(GAME_ICONS.len(), 12);
        assert_eq!(ids.len(), 12);
    }

    #[test]
    fn icon_id_parse__rejects_unknown_ids() {
        assert_eq!(IconId::parse("sun").map(|id| id.as_str()), Some("sun"));
        assert!(IconId::parse("moon").is_none());
        assert!(IconId::parse("").is_none());
    }

    #[test]
    fn icon_index__matches_grid_position() {
        // given
        let rabbit = IconId::parse("rabbit").unwrap();

        // then
        assert_eq!(icon_index(rabbit), 11);
        assert_eq!(icon_def(rabbit).display_name, "Rabbit");
    }
}
