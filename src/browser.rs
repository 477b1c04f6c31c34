use std::time::Duration;

use anyhow::{Context, Result};
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::Config;
use crate::page::PageDriver;

/// One exclusively-owned headless Chrome session. Acquired at run start,
/// released through `close` on every exit path; the CDP event handler task
/// is aborted alongside the browser process.
pub struct BrowserSession {
    browser: Option<Browser>,
    handler: Option<JoinHandle<()>>,
    page: Page,
    page_load_timeout: Duration,
}

impl BrowserSession {
    pub async fn launch(config: &Config) -> Result<Self> {
        let mut builder = BrowserConfig::builder()
            .request_timeout(config.page_load_timeout())
            .arg(format!("--user-agent={}", config.user_agent))
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage");
        if !config.headless {
            builder = builder.with_head();
        }
        let browser_config = builder
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build browser config: {e}"))?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .context("Failed to launch browser")?;

        // The handler stream must be pumped for the session to make progress.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    warn!("browser handler error: {e:?}");
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .context("Failed to open a page")?;

        info!(headless = config.headless, "browser session started");
        Ok(Self {
            browser: Some(browser),
            handler: Some(handler_task),
            page,
            page_load_timeout: config.page_load_timeout(),
        })
    }

    async fn eval<T>(&self, expr: String) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let value = self
            .page
            .evaluate(expr)
            .await
            .context("Script evaluation failed")?
            .into_value()
            .context("Unexpected script result")?;
        Ok(value)
    }
}

impl PageDriver for BrowserSession {
    async fn navigate(&mut self, url: &str) -> Result<bool> {
        let deadline = self.page_load_timeout;
        let load = async {
            self.page.goto(url).await?;
            self.page.wait_for_navigation().await?;
            anyhow::Ok(())
        };
        match tokio::time::timeout(deadline, load).await {
            Ok(Ok(())) => Ok(true),
            Ok(Err(e)) => {
                warn!(url, error = %e, "navigation failed");
                Ok(false)
            }
            Err(_) => {
                warn!(url, "navigation timed out");
                Ok(false)
            }
        }
    }

    async fn count_blocks(&mut self, selector: &str) -> Result<usize> {
        let quoted = serde_json::to_string(selector)?;
        self.eval(format!("document.querySelectorAll({quoted}).length"))
            .await
    }

    async fn marker_present(&mut self, selector: &str) -> Result<bool> {
        let quoted = serde_json::to_string(selector)?;
        self.eval(format!("document.querySelector({quoted}) !== null"))
            .await
    }

    async fn trigger_load_step(&mut self) -> Result<()> {
        self.page
            .evaluate("window.scrollTo(0, document.body.scrollHeight);")
            .await
            .context("Scroll step failed")?;
        Ok(())
    }

    async fn pause(&mut self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    async fn html(&mut self) -> Result<String> {
        self.page
            .content()
            .await
            .context("Failed to snapshot page HTML")
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(mut browser) = self.browser.take() {
            if let Err(e) = browser.close().await {
                warn!("browser close failed: {e}");
            }
            let _ = browser.wait().await;
            info!("browser session closed");
        }
        if let Some(handler) = self.handler.take() {
            handler.abort();
        }
        Ok(())
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        // Fallback if close() was never reached; Browser::drop kills Chrome.
        if let Some(handler) = self.handler.take() {
            handler.abort();
        }
    }
}
