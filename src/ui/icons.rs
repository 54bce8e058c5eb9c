//! Shared UI icons with plain-text fallbacks for terminals without emoji.

use console::Emoji;

// Status indicators
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK]");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "[ERR]");
pub static SPARKLE: Emoji<'_, '_> = Emoji("✨ ", "*");

// Stage indicators
pub static DONE: Emoji<'_, '_> = Emoji("✅", "[x]");
pub static IN_PROGRESS: Emoji<'_, '_> = Emoji("🔄", "[~]");
pub static PENDING: Emoji<'_, '_> = Emoji("⏳", "[ ]");

// Dashboard tiles
pub static LEADS: Emoji<'_, '_> = Emoji("👥 ", "");
pub static PROJECTS: Emoji<'_, '_> = Emoji("📁 ", "");
pub static MONEY: Emoji<'_, '_> = Emoji("💰 ", "$ ");
pub static CHART: Emoji<'_, '_> = Emoji("📊 ", "");
pub static BOT: Emoji<'_, '_> = Emoji("🤖 ", "");
pub static CLOCK: Emoji<'_, '_> = Emoji("⏱️  ", "");
