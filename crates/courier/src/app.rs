use dispatch::{DispatchResult, Session};
use geocoding::Geocoder;
use model::delivery::Placement;
use tokio::{
    io::{self, AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt},
    task::JoinSet,
};
use tokio_stream::{wrappers::LinesStream, StreamExt};

use crate::terminal::{self, Input};

/// Reads addresses and commands line by line from `input` and writes
/// everything the user sees to `output`.
///
/// Every address becomes its own task, so a slow lookup never blocks the
/// prompt. The view is re-rendered whenever a lookup finishes. Once the
/// input ends (or `:quit`), pending lookups are awaited and the list is
/// rendered one last time before returning.
pub async fn run<G, R, W>(session: Session<G>, input: R, mut output: W) -> io::Result<()>
where
    G: Geocoder + 'static,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = LinesStream::new(input.lines());
    let mut pending: JoinSet<(String, DispatchResult<Placement>)> = JoinSet::new();
    let mut input_open = true;

    output.write_all(terminal::HELP.as_bytes()).await?;
    show_list(&session, &mut output).await?;

    loop {
        tokio::select! {
            line = lines.next(), if input_open => match line {
                Some(Ok(line)) => match Input::parse(&line) {
                    Input::Submit(address) => {
                        let session = session.clone();
                        pending.spawn(async move {
                            let outcome = session.submit(&address).await;
                            (address, outcome)
                        });
                    }
                    Input::List => show_list(&session, &mut output).await?,
                    Input::Route => show_route(&session, &mut output).await?,
                    Input::GeoJson => show_geojson(&session, &mut output).await?,
                    Input::Help => output.write_all(terminal::HELP.as_bytes()).await?,
                    Input::Quit => input_open = false,
                    Input::Empty => {}
                    Input::Unknown(command) => {
                        let text = format!("Unknown command '{command}'.\n{}", terminal::HELP);
                        output.write_all(text.as_bytes()).await?;
                    }
                },
                Some(Err(why)) => {
                    log::error!("reading input failed: {why}");
                    input_open = false;
                }
                None => input_open = false,
            },
            Some(joined) = pending.join_next() => match joined {
                Ok((address, outcome)) => {
                    output
                        .write_all(terminal::render_outcome(&address, &outcome).as_bytes())
                        .await?;
                    if outcome.is_ok() {
                        show_list(&session, &mut output).await?;
                    }
                }
                Err(why) => log::error!("lookup task failed: {why}"),
            },
            else => break,
        }
        output.flush().await?;
    }

    show_list(&session, &mut output).await?;
    output.write_all(b"Bye.\n").await?;
    output.flush().await
}

async fn show_list<G: Geocoder, W: AsyncWrite + Unpin>(
    session: &Session<G>,
    output: &mut W,
) -> io::Result<()> {
    let text = match session.planner().map_view().await {
        Ok(view) => terminal::render_list(&view),
        Err(why) => format!("{}\n", why.user_message()),
    };
    output.write_all(text.as_bytes()).await
}

async fn show_route<G: Geocoder, W: AsyncWrite + Unpin>(
    session: &Session<G>,
    output: &mut W,
) -> io::Result<()> {
    let text = match session.planner().map_view().await {
        Ok(view) => terminal::render_route(&view),
        Err(why) => format!("{}\n", why.user_message()),
    };
    output.write_all(text.as_bytes()).await
}

async fn show_geojson<G: Geocoder, W: AsyncWrite + Unpin>(
    session: &Session<G>,
    output: &mut W,
) -> io::Result<()> {
    let text = match session.planner().map_view().await {
        Ok(view) => match serde_json::to_string_pretty(&view.to_geojson()) {
            Ok(json) => json + "\n",
            Err(why) => {
                log::error!("could not serialize the map: {why}");
                "Could not export the map.\n".to_owned()
            }
        },
        Err(why) => format!("{}\n", why.user_message()),
    };
    output.write_all(text.as_bytes()).await
}
