use teloxide::types::{KeyboardButton, KeyboardMarkup};

use crate::flow::Menu;

/// One-button reply keyboard: "register" before registration, "lookup" after.
pub fn menu_keyboard(menu: Menu) -> KeyboardMarkup {
    KeyboardMarkup::new(vec![vec![KeyboardButton::new(menu.button())]])
        .resize_keyboard()
        .one_time_keyboard()
}
