//! Long-polling loop
//!
//! One batch of updates is fetched at a time and handled strictly in
//! order. The cursor moves past an update before that update is handled, so
//! an update is never fetched again once processing has started.

use crate::dispatcher::Dispatcher;
use crate::error::{BotError, BotResult};
use crate::telegram::{Messenger, TelegramError};
use std::future::Future;
use std::time::Duration;
use tracing::{error, info, warn};

/// Offset for the next getUpdates call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateCursor {
    offset: Option<i64>,
}

impl UpdateCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offset(&self) -> Option<i64> {
        self.offset
    }

    /// Acknowledge `update_id` and everything before it
    pub fn advance_past(&mut self, update_id: i64) {
        self.offset = Some(update_id + 1);
    }
}

/// Fetch one batch and handle every update in it
///
/// Returns the number of updates handled. An update whose handling fails
/// because the user blocked the bot is skipped; any other failure stops the
/// batch and is returned.
pub async fn poll_once(
    messenger: &dyn Messenger,
    dispatcher: &Dispatcher,
    cursor: &mut UpdateCursor,
    timeout_secs: u64,
) -> BotResult<usize> {
    let updates = messenger.get_updates(cursor.offset(), timeout_secs).await?;
    let mut handled = 0;

    for update in &updates {
        cursor.advance_past(update.update_id);

        match dispatcher.handle_update(messenger, update).await {
            Ok(()) => handled += 1,
            Err(BotError::Telegram(TelegramError::Unauthorized(reason))) => {
                warn!(update_id = update.update_id, reason = %reason, "Skipping update from user who blocked the bot");
            }
            Err(e) => return Err(e),
        }
    }

    Ok(handled)
}

/// Poll until `shutdown` completes or a fatal error occurs
///
/// Transient platform failures pause briefly and retry. Errors that are not
/// transient end the loop so an external supervisor can restart the bot.
pub async fn run<F>(
    messenger: &dyn Messenger,
    dispatcher: &Dispatcher,
    timeout_secs: u64,
    shutdown: F,
) -> BotResult<()>
where
    F: Future<Output = ()>,
{
    let mut cursor = UpdateCursor::new();
    tokio::pin!(shutdown);

    info!(timeout_secs, "Polling for updates");

    loop {
        let result = tokio::select! {
            _ = &mut shutdown => {
                info!("Shutdown requested, stopping poll loop");
                return Ok(());
            }
            result = poll_once(messenger, dispatcher, &mut cursor, timeout_secs) => result,
        };

        match result {
            Ok(_) => {}
            Err(BotError::Telegram(e)) => match e.retry_delay() {
                Some(delay) => {
                    warn!(error = %e, delay_ms = delay.as_millis() as u64, "Transient Telegram error, retrying");
                    if pause(delay, &mut shutdown).await {
                        info!("Shutdown requested, stopping poll loop");
                        return Ok(());
                    }
                }
                None => {
                    error!(error = %e, "Fatal Telegram error");
                    return Err(BotError::Telegram(e));
                }
            },
            Err(e) => {
                error!(error = %e, "Fatal error while handling updates");
                return Err(e);
            }
        }
    }
}

/// Sleep for `delay`; true if shutdown completed first
async fn pause<F: Future<Output = ()> + Unpin>(delay: Duration, shutdown: &mut F) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(delay) => false,
        _ = shutdown => true,
    }
}
