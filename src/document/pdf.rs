use std::sync::Arc;
use std::time::Duration;

use chromiumoxide::cdp::browser_protocol::page::PrintToPdfParams;
use chromiumoxide::error::CdpError;
use chromiumoxide::{Browser, BrowserConfig};
use futures::StreamExt;
use thiserror::Error;
use tokio::sync::Semaphore;

const MM_PER_INCH: f64 = 25.4;

// How long a browser gets to exit on its own before it is killed
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

// A4 in inches
const A4_WIDTH: f64 = 8.27;
const A4_HEIGHT: f64 = 11.69;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to launch browser: {0}")]
    Launch(String),

    #[error("browser error: {0}")]
    Browser(#[from] CdpError),

    #[error("rendering did not finish within {0}s")]
    Timeout(u64),

    #[error("renderer is shutting down")]
    Closed,
}

/// Page margins in millimetres. Paper is always A4 with backgrounds printed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageLayout {
    pub margin_top_mm: f64,
    pub margin_bottom_mm: f64,
    pub margin_left_mm: f64,
    pub margin_right_mm: f64,
}

impl PageLayout {
    pub const SALARY_SLIP: PageLayout = PageLayout {
        margin_top_mm: 10.0,
        margin_bottom_mm: 10.0,
        margin_left_mm: 10.0,
        margin_right_mm: 10.0,
    };

    pub const OFFER_LETTER: PageLayout = PageLayout {
        margin_top_mm: 15.0,
        margin_bottom_mm: 15.0,
        margin_left_mm: 10.0,
        margin_right_mm: 10.0,
    };

    fn print_params(&self) -> PrintToPdfParams {
        PrintToPdfParams {
            print_background: Some(true),
            paper_width: Some(A4_WIDTH),
            paper_height: Some(A4_HEIGHT),
            margin_top: Some(self.margin_top_mm / MM_PER_INCH),
            margin_bottom: Some(self.margin_bottom_mm / MM_PER_INCH),
            margin_left: Some(self.margin_left_mm / MM_PER_INCH),
            margin_right: Some(self.margin_right_mm / MM_PER_INCH),
            ..Default::default()
        }
    }
}

/// HTML to PDF through a headless Chromium, one browser per render.
///
/// At most `max_concurrency` browsers run at once; further renders wait for
/// a permit. Every browser is closed before `render` returns, whether the
/// print succeeded, failed or timed out.
#[derive(Clone)]
pub struct PdfRenderer {
    permits: Arc<Semaphore>,
    chrome_path: Option<String>,
    timeout: Duration,
}

impl PdfRenderer {
    pub fn new(max_concurrency: usize, chrome_path: Option<String>, timeout: Duration) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(max_concurrency.max(1))),
            chrome_path,
            timeout,
        }
    }

    fn browser_config(&self) -> Result<BrowserConfig, RenderError> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .arg("--disable-setuid-sandbox")
            .arg("--disable-dev-shm-usage");
        if let Some(path) = &self.chrome_path {
            builder = builder.chrome_executable(path);
        }
        builder.build().map_err(RenderError::Launch)
    }

    pub async fn render(&self, html: &str, layout: PageLayout) -> Result<Vec<u8>, RenderError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| RenderError::Closed)?;

        let (mut browser, mut handler) = Browser::launch(self.browser_config()?).await?;
        // Keep polling past errors; the browser stops answering commands
        // once the handler is dropped.
        let events = tokio::spawn(async move { while handler.next().await.is_some() {} });

        let printed = tokio::time::timeout(self.timeout, async {
            let page = browser.new_page("about:blank").await?;
            page.set_content(html).await?;
            page.pdf(layout.print_params()).await
        })
        .await;

        shut_down(&mut browser).await;
        events.abort();

        match printed {
            Ok(result) => Ok(result?),
            Err(_) => Err(RenderError::Timeout(self.timeout.as_secs())),
        }
    }
}

/// Asks the browser to exit and reaps it, killing the process if either
/// step fails or stalls.
async fn shut_down(browser: &mut Browser) {
    let closed = tokio::time::timeout(SHUTDOWN_GRACE, browser.close()).await;
    let exited = match closed {
        Ok(Ok(_)) => {
            let reaped = tokio::time::timeout(SHUTDOWN_GRACE, browser.wait()).await;
            matches!(reaped, Ok(Ok(_)))
        }
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "Failed to close browser");
            false
        }
        Err(_) => {
            tracing::warn!("Browser did not acknowledge close in time");
            false
        }
    };

    if !exited {
        if let Some(Err(e)) = browser.kill().await {
            tracing::warn!(error = %e, "Failed to kill browser process");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn margins_convert_to_inches() {
        let params = PageLayout::OFFER_LETTER.print_params();
        assert_eq!(params.print_background, Some(true));
        assert_eq!(params.paper_width, Some(A4_WIDTH));
        let top = params.margin_top.unwrap();
        assert!((top - 15.0 / 25.4).abs() < 1e-9);
        assert_eq!(params.margin_left, PageLayout::SALARY_SLIP.print_params().margin_left);
    }

    #[test]
    fn zero_concurrency_still_allows_one_render() {
        let renderer = PdfRenderer::new(0, None, Duration::from_secs(5));
        assert_eq!(renderer.permits.available_permits(), 1);
    }

    #[actix_web::test]
    async fn launch_failure_surfaces_and_returns_the_permit() {
        let renderer = PdfRenderer::new(
            2,
            Some("/nonexistent/chrome".to_string()),
            Duration::from_secs(5),
        );

        for _ in 0..3 {
            let result = renderer.render("<p>hi</p>", PageLayout::SALARY_SLIP).await;
            assert!(matches!(
                result,
                Err(RenderError::Launch(_) | RenderError::Browser(_))
            ));
            assert_eq!(renderer.permits.available_permits(), 2);
        }
    }
}
