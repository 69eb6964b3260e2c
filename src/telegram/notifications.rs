use teloxide::prelude::*;

const STARTUP_TEXT: &str = "Я запущен🥳.";
const SHUTDOWN_TEXT: &str = "Бот остановлен. За что?😔";

/// Sends `text` to every operator. Delivery failures are logged and skipped.
pub async fn notify_admins(bot: &Bot, admin_ids: &[i64], text: &str) {
    for &admin_id in admin_ids {
        if let Err(e) = bot.send_message(ChatId(admin_id), text).await {
            log::error!("Failed to notify admin {}: {}", admin_id, e);
        }
    }
}

pub async fn notify_admins_startup(bot: &Bot, admin_ids: &[i64]) {
    notify_admins(bot, admin_ids, STARTUP_TEXT).await;
    log::info!("Startup notification sent to {} admin(s)", admin_ids.len());
}

pub async fn notify_admins_shutdown(bot: &Bot, admin_ids: &[i64]) {
    notify_admins(bot, admin_ids, SHUTDOWN_TEXT).await;
}
