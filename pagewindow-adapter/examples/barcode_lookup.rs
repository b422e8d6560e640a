use pagewindow::{Query, QueryOptions};
use pagewindow_adapter::{FetchError, Lookup, LookupSource, SourceFuture};

struct Catalogue(Vec<String>);

impl LookupSource for Catalogue {
    type Record = String;

    fn lookup<'a>(&'a self, query: &'a Query) -> SourceFuture<'a, Vec<String>> {
        Box::pin(async move {
            tokio::time::sleep(std::time::Duration::from_millis(30)).await;
            if query.trimmed() == "offline" {
                return Err(FetchError::Network("catalogue unreachable".to_string()));
            }
            Ok(self
                .0
                .iter()
                .filter(|p| p.contains(query.trimmed()))
                .cloned()
                .collect())
        })
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Example: a search box fed by keystrokes and a barcode scanner.
    //
    // Typed text waits for input to settle; scanned or pasted codes go out at once; results of
    // superseded queries never show up.
    let catalogue = Catalogue(vec![
        "7501031311309 carton".to_string(),
        "7501031311316 carton".to_string(),
        "500123456 pallet".to_string(),
        "widget small".to_string(),
        "widget large".to_string(),
    ]);
    let mut lookup = Lookup::new(catalogue, QueryOptions::default().with_debounce_ms(300));

    for text in ["w", "wi", "wid", "widg", "widget"] {
        println!("input {text:?} -> {:?}", lookup.on_input_change(text));
    }
    if let Some(outcome) = lookup.settle().await {
        println!("typed: {outcome:?} {:?}", lookup.results());
    }

    lookup.on_scan_error("no barcode in frame");
    println!("notice: {:?}", lookup.error());

    if lookup.on_scan_result("7501031311309").is_ok() {
        if let Some(outcome) = lookup.settle().await {
            println!("scanned: {outcome:?} {:?}", lookup.results());
        }
    }

    lookup.submit("offline");
    if let Some(outcome) = lookup.settle().await {
        println!("failed: {outcome:?} error={:?}", lookup.error());
    }
}
