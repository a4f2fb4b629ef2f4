pub mod advisor;
pub mod config;
pub mod controller;
pub mod error;
pub mod history;
pub mod icons;
pub mod phase;
pub mod round;
pub mod wallet;

pub mod test_helpers;

pub use config::AppConfig;
pub use controller::{
    GameController,
    GameSnapshot,
    RoundOutcome,
    RoundView,
};
pub use error::{
    GameError,
    GameResult,
};
pub use history::{
    HISTORY_CAPACITY,
    HistoryEntry,
    HistoryLog,
};
pub use icons::{
    BET_AMOUNTS,
    BET_MULTIPLIER,
    DEFAULT_BET_AMOUNT,
    GAME_ICONS,
    GRANT_AMOUNT,
    INITIAL_BALANCE,
    IconDef,
    IconId,
    icon,
    icon_def,
};
pub use round::{
    Bet,
    DrawSource,
    RandomDraw,
    RoundEngine,
    RoundStatus,
};
pub use wallet::{
    WalletLedger,
    WalletState,
};
