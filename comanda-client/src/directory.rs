//! Tab list bound to the message channel

use std::time::{Duration, Instant};

use comanda_core::{TAB_LIST_TIMEOUT, TabDirectory};
use shared::order::{OrderCommand, TabsListed};

use crate::error::ClientResult;
use crate::message::{MessageClient, MessageError, Subscription};
use crate::session::RefreshOutcome;

/// Open and closed tabs, kept current from the backend's tab lists
#[derive(Debug)]
pub struct TabList {
    client: MessageClient,
    listings: Subscription<TabsListed>,
    directory: TabDirectory,
    timeout: Duration,
}

impl TabList {
    /// Start listening; the lists stay empty until the first answer.
    pub fn open(client: &MessageClient) -> Self {
        Self {
            client: client.clone(),
            listings: client.subscribe_tab_lists(),
            directory: TabDirectory::new(),
            timeout: TAB_LIST_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn directory(&self) -> &TabDirectory {
        &self.directory
    }

    /// Search text and refresh state
    pub fn directory_mut(&mut self) -> &mut TabDirectory {
        &mut self.directory
    }

    /// Ask for the tab list and wait for it.
    ///
    /// Without an answer in time the refresh ends and the lists stay as
    /// they were.
    pub async fn refresh(&mut self) -> ClientResult<RefreshOutcome> {
        self.directory.begin_refresh(Instant::now());
        if let Err(e) = self.client.send_command(&OrderCommand::list_tabs()).await {
            self.directory.end_refresh();
            return Err(e.into());
        }
        match tokio::time::timeout(self.timeout, self.listings.recv()).await {
            Ok(Some(listing)) => {
                self.directory.apply(listing);
                Ok(RefreshOutcome::Updated)
            }
            Ok(None) => {
                self.directory.end_refresh();
                Err(MessageError::Closed.into())
            }
            Err(_) => {
                tracing::warn!(timeout = ?self.timeout, "Tab list refresh timed out");
                self.directory.end_refresh();
                Ok(RefreshOutcome::TimedOut)
            }
        }
    }

    /// Wait for a list the backend pushes on its own; `false` once the
    /// channel closed.
    pub async fn next_listing(&mut self) -> bool {
        match self.listings.recv().await {
            Some(listing) => {
                self.directory.apply(listing);
                true
            }
            None => false,
        }
    }
}
