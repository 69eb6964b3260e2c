//! Replies produced by the flow, independent of the chat transport

use super::state::SessionState;

pub const REGISTRATION_BUTTON: &str = "Регистрация";
pub const LOOKUP_BUTTON: &str = "Информация по IMEI";

pub const ENTER_IMEI: &str = "Введите IMEI (15 цифр без пробелов).";
pub const REGISTRATION_REQUIRED: &str = "Необходимо пройти регистрацию!";
pub const INVALID_IMEI: &str = "IMEI должен содержать 15 цифр без пробелов. Попробуйте ввести еще раз.";
pub const CHOOSE_COMMAND: &str = "Необходимо выбрать команду для начала работы";
pub const STORAGE_FAILURE: &str =
    "Произошла ошибка при обработке вашего запроса. Пожалуйста, попробуйте снова позже.";
pub const LOOKUP_FAILURE: &str = "Не удалось получить информацию по IMEI. Пожалуйста, попробуйте снова позже.";

pub fn greeting_registered(name: &str) -> String {
    format!("👋 Привет, {}! Выберите следующее действие", name)
}

pub fn greeting_unregistered(name: &str) -> String {
    format!("👋 Привет, {}! Зарегистрируйтесь для дальнейшей работы", name)
}

pub fn registered(name: &str) -> String {
    format!("Пользователь, {} успешно зарегистрирован! Нажми кнопку 👇", name)
}

pub fn already_registered(name: &str) -> String {
    format!("Пользователь, {} уже зарегистрирован! Нажми кнопку 👇", name)
}

/// Reply keyboard to attach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Menu {
    /// Single "register" button
    Unregistered,
    /// Single "lookup" button
    Registered,
}

impl Menu {
    pub fn button(self) -> &'static str {
        match self {
            Menu::Unregistered => REGISTRATION_BUTTON,
            Menu::Registered => LOOKUP_BUTTON,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub menu: Option<Menu>,
    /// Send as a reply to the inbound message
    pub quote: bool,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            menu: None,
            quote: false,
        }
    }

    pub fn quoted(text: impl Into<String>) -> Self {
        Self {
            quote: true,
            ..Self::text(text)
        }
    }

    pub fn with_menu(mut self, menu: Menu) -> Self {
        self.menu = Some(menu);
        self
    }
}

/// Result of one flow step: the single reply and the state to store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub reply: Reply,
    pub next: SessionState,
}

impl Outcome {
    pub fn new(reply: Reply, next: SessionState) -> Self {
        Self { reply, next }
    }
}
