//! Interaction with the operator at the terminal.

use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

/// How the login wait ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginWait {
    /// The operator pressed Enter.
    Confirmed,
    /// Input was closed before the operator answered.
    InputClosed,
    /// The wait limit passed.
    TimedOut,
}

/// Tell the operator how to reach the console and wait for Enter, at most
/// `limit`.
///
/// # Errors
///
/// Returns an I/O error if the instructions cannot be written or the input
/// cannot be read.
pub async fn wait_for_login<R, W>(
    input: R,
    output: &mut W,
    admin_url: &str,
    limit: Duration,
) -> std::io::Result<LoginWait>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let instructions = format!(
        "\nA browser window is open on {admin_url}\n\
         1. Log in to WordPress\n\
         2. Leave the window on the admin dashboard\n\
         Press Enter here to start (waiting up to {} minutes)...\n",
        limit.as_secs().div_ceil(60)
    );
    output.write_all(instructions.as_bytes()).await?;
    output.flush().await?;

    let mut lines = input.lines();
    let outcome = match tokio::time::timeout(limit, lines.next_line()).await {
        Ok(Ok(Some(_))) => LoginWait::Confirmed,
        Ok(Ok(None)) => LoginWait::InputClosed,
        Ok(Err(err)) => return Err(err),
        Err(_) => LoginWait::TimedOut,
    };
    match outcome {
        LoginWait::Confirmed => tracing::info!("operator confirmed login"),
        LoginWait::InputClosed => tracing::warn!("input closed, proceeding without confirmation"),
        LoginWait::TimedOut => tracing::warn!(
            limit_secs = limit.as_secs(),
            "login wait timed out, proceeding"
        ),
    }
    Ok(outcome)
}

/// Ask a yes/no question until answered. Closed input counts as "no".
///
/// # Errors
///
/// Returns an I/O error if the prompt cannot be written or the input
/// cannot be read.
pub async fn ask_yes_no<R, W>(input: R, output: &mut W, question: &str) -> std::io::Result<bool>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    loop {
        output.write_all(format!("{question} (y/n): ").as_bytes()).await?;
        output.flush().await?;
        let Some(line) = lines.next_line().await? else {
            return Ok(false);
        };
        match line.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => output.write_all(b"Please answer 'y' or 'n'.\n").await?,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::BufReader;

    #[tokio::test]
    async fn should_confirm_when_operator_presses_enter() {
        let mut output = Vec::new();
        let outcome = wait_for_login(
            &b"\n"[..],
            &mut output,
            "https://dealer.example/wp/wp-admin/",
            Duration::from_secs(900),
        )
        .await
        .unwrap();
        assert_eq!(outcome, LoginWait::Confirmed);
        let shown = String::from_utf8(output).unwrap();
        assert!(shown.contains("https://dealer.example/wp/wp-admin/"));
        assert!(shown.contains("up to 15 minutes"));
    }

    #[tokio::test]
    async fn should_report_closed_input() {
        let mut output = Vec::new();
        let outcome = wait_for_login(&b""[..], &mut output, "x", Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(outcome, LoginWait::InputClosed);
    }

    #[tokio::test]
    async fn should_time_out_when_operator_never_answers() {
        let (_writer, reader) = tokio::io::duplex(64);
        let mut output = Vec::new();
        let outcome = wait_for_login(
            BufReader::new(reader),
            &mut output,
            "x",
            Duration::from_millis(20),
        )
        .await
        .unwrap();
        assert_eq!(outcome, LoginWait::TimedOut);
    }

    #[tokio::test]
    async fn should_reask_until_answer_is_recognised() {
        let mut output = Vec::new();
        let answer = ask_yes_no(&b"maybe\nYES\n"[..], &mut output, "Configure?")
            .await
            .unwrap();
        assert!(answer);
        let shown = String::from_utf8(output).unwrap();
        assert_eq!(shown.matches("Configure? (y/n)").count(), 2);
    }

    #[tokio::test]
    async fn should_answer_no_when_input_closed() {
        let mut output = Vec::new();
        assert!(!ask_yes_no(&b""[..], &mut output, "Configure?").await.unwrap());
    }
}
