use anyhow::{anyhow, Context};
use notes_client::{api::EntryId, HttpService, Session};

mod render;

const DEFAULT_HOST: &str = "http://127.0.0.1:5050";

#[derive(structopt::StructOpt)]
struct Opt {
    /// Notes service to talk to, defaults to $NOTES_HOST or http://127.0.0.1:5050
    #[structopt(short, long)]
    host: Option<String>,

    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(structopt::StructOpt)]
enum Command {
    /// List all stored entries
    List,

    /// List all tags, with their number of entries
    Tags,

    /// List the entries carrying a tag
    Tag { tag: String },

    /// Show entries with their replies nested below them
    Thread {
        /// Only show the thread starting at this entry
        id: Option<EntryId>,
    },

    /// Create a new entry
    New {
        title: String,

        text: String,

        /// Space-separated tags
        #[structopt(short, long, default_value = "")]
        tags: String,
    },

    /// Reply to an entry, inheriting its tags and "Re:" title
    Reply {
        id: EntryId,

        text: String,

        #[structopt(long)]
        title: Option<String>,

        #[structopt(short, long)]
        tags: Option<String>,
    },
}

fn host(opt: Option<String>) -> String {
    opt.or_else(|| std::env::var("NOTES_HOST").ok())
        .unwrap_or_else(|| String::from(DEFAULT_HOST))
}

async fn submit(session: &mut Session<HttpService>) -> anyhow::Result<()> {
    let resp = session.submit().await.context("submitting entry")?;
    if session.is_stale() {
        tracing::warn!("entry saved but the stored data could not be re-fetched");
    }
    println!("{}", resp.message);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let opt = <Opt as structopt::StructOpt>::from_args();
    let host = host(opt.host);
    tracing::debug!(%host, "using notes service");
    let mut session = Session::new(HttpService::new(host));
    session.refresh().await.context("fetching stored data")?;

    match opt.cmd {
        Command::List => {
            let store = session.store();
            print!("{}", render::entries(store, store.all().iter().map(|e| &**e)));
        }
        Command::Tags => print!("{}", render::tags(session.tag_index())),
        Command::Tag { tag } => {
            let entries = session.select_tag(&tag);
            print!(
                "{}",
                render::entries(session.store(), entries.iter().map(|e| &**e))
            );
        }
        Command::Thread { id } => {
            let store = session.store();
            let roots = match id {
                Some(id) => vec![store
                    .by_id(&id)
                    .cloned()
                    .ok_or_else(|| anyhow!("no entry with id {id}"))?],
                None => store.top_level(),
            };
            let roots = roots.iter().map(|e| &**e).collect::<Vec<_>>();
            print!("{}", render::threads(store, &roots));
        }
        Command::New { title, text, tags } => {
            session.set_title(title);
            session.set_text(text);
            session.set_tags(tags);
            submit(&mut session).await?;
        }
        Command::Reply {
            id,
            text,
            title,
            tags,
        } => {
            session
                .start_reply(&id)
                .ok_or_else(|| anyhow!("no entry with id {id}"))?;
            session.set_text(text);
            if let Some(title) = title {
                session.set_title(title);
            }
            if let Some(tags) = tags {
                session.set_tags(tags);
            }
            submit(&mut session).await?;
        }
    }

    Ok(())
}
