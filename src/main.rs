mod ui;

use color_eyre::eyre::Result;
use personal_diary::config::Config;
use personal_diary::diary_state::EntryStore;
use personal_diary::draft::{DraftEditor, Notice, NoticeKind};
use personal_diary::grammar::{CompletionClient, GrammarChecker};
use personal_diary::logging;
use personal_diary::storage::FileStorage;
use std::sync::Arc;
use tracing::{info, warn};
use ui::{Action, UI};

fn main() -> Result<()> {
    color_eyre::install()?;

    let config = Config::load()?;
    let storage = FileStorage::open(&config.data_dir)?;
    logging::init(&config)?;
    info!(?config, "starting personal diary");

    let mut store = EntryStore::open(storage)?;

    let checker = match CompletionClient::from_config(&config) {
        Ok(client) => Some(Arc::new(GrammarChecker::new(client))),
        Err(e) => {
            warn!(error = %e, "grammar check disabled");
            None
        }
    };
    let runtime = tokio::runtime::Runtime::new()?;

    let mut ui = UI::new()?;

    loop {
        ui.display(&store)?;

        if let Some(action) = ui.handle_input(&store)? {
            match action {
                Action::Write => {
                    ui.compose(
                        DraftEditor::new(),
                        &mut store,
                        checker.as_ref(),
                        runtime.handle(),
                    )?;
                }
                Action::View => {
                    ui.view_entries(store.entries(), "View Entries")?;
                }
                Action::Edit => {
                    if let Some(id) = ui.select_entry(&store, "Select Entry to Edit")? {
                        match store.require(&id).map(DraftEditor::for_entry) {
                            Ok(editor) => {
                                ui.compose(editor, &mut store, checker.as_ref(), runtime.handle())?;
                            }
                            Err(e) => ui.set_status(Notice::new(e.to_string(), NoticeKind::Error)),
                        }
                    }
                }
                Action::Delete => {
                    ui.delete_entries(&mut store)?;
                }
                Action::Search => {
                    let query = ui.get_search_query()?;
                    if !query.is_empty() {
                        let results = store.search(&query);
                        ui.view_entries(&results, "Search Results")?;
                    }
                }
                Action::Quit => break,
            }
        }
    }

    info!("personal diary closed");
    Ok(())
}
