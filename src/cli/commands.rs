use std::io::Write;
use std::path::Path;

use crossterm::style::Stylize;
use tokio_util::sync::CancellationToken;

use crate::app::{AppContext, Result};
use crate::domain::SearchOptions;
use crate::query::{plan, RequestDescriptor};
use crate::spinner::Spinner;
use crate::tail::TailLoop;

/// Print enabled streams in title order. Titles are bold on a terminal.
pub async fn list_streams<W: Write>(ctx: &mut AppContext, bold: bool, out: &mut W) -> Result<()> {
    let streams = ctx.load_streams().await?;

    if streams.is_empty() {
        writeln!(out, "No streams found")?;
        return Ok(());
    }

    for stream in streams {
        let line = stream.display_line();
        if bold {
            writeln!(out, "{}", line.bold())?;
        } else {
            writeln!(out, "{}", line)?;
        }
    }
    Ok(())
}

/// Run one search and print the results, or write them to `export.csv` in
/// the working directory when the options ask for an export.
pub async fn list_messages<W: Write>(
    ctx: &mut AppContext,
    options: &SearchOptions,
    out: &mut W,
) -> Result<()> {
    let stream_ids = ctx.resolve_streams(options).await?;
    let request = plan(options, &stream_ids);
    tracing::debug!("Searching {}", request.uri());

    if request.export {
        let dir = std::env::current_dir()?;
        return export_messages(ctx, &request, &dir, out).await;
    }

    let records = ctx.poll(&request).await?;
    for record in &records {
        writeln!(out, "{}", ctx.render(record))?;
    }
    out.flush()?;
    Ok(())
}

pub async fn export_messages<W: Write>(
    ctx: &AppContext,
    request: &RequestDescriptor,
    dir: &Path,
    out: &mut W,
) -> Result<()> {
    writeln!(out, "Exporting...")?;
    out.flush()?;

    let path = ctx.export(request, dir).await?;
    writeln!(out, "Contents exported to {}", path.display())?;
    Ok(())
}

/// Keep printing new messages until `cancel` fires.
pub async fn tail<W: Write>(
    ctx: &mut AppContext,
    options: &SearchOptions,
    cancel: CancellationToken,
    out: &mut W,
) -> Result<()> {
    let stream_ids = ctx.resolve_streams(options).await?;
    let request = plan(options, &stream_ids);
    tracing::debug!("Tailing {}", request.uri());

    let mut tail = TailLoop::new(ctx, request, cancel)?.with_spinner(Spinner::for_stderr());
    tail.run(out).await?;
    tracing::debug!(
        "Tail stopped after {} polls, {} messages",
        tail.cycles(),
        tail.printed()
    );
    Ok(())
}
