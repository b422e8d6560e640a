use pagewindow::{Filters, Page, PagerOptions};
use pagewindow_adapter::{Controller, ControllerOptions, PageSource, SourceFuture};

struct Ledger(Vec<u32>);

impl PageSource for Ledger {
    type Record = u32;

    fn list_page<'a>(
        &'a self,
        filters: &'a Filters,
        page: usize,
        page_size: usize,
    ) -> SourceFuture<'a, Page<u32>> {
        Box::pin(async move {
            let rows: Vec<u32> = match filters.get("document") {
                Some(text) => self
                    .0
                    .iter()
                    .copied()
                    .filter(|r| r.to_string().contains(text.as_str()))
                    .collect(),
                None => self.0.clone(),
            };
            let start = ((page - 1) * page_size).min(rows.len());
            let end = (page * page_size).min(rows.len());
            Ok(Page {
                data: rows[start..end].to_vec(),
                total: rows.len(),
                has_more: end < rows.len(),
            })
        })
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Example: a ledger page with a filter box, infinite scroll and row selection.
    let options = ControllerOptions::new(PagerOptions::new(|r: &u32| *r))
        .with_base_filter("warehouse", "north")
        .with_filter_field("document");
    let mut page = Controller::new(Ledger((1..=130).collect()), options);

    if let Err(err) = page.load().await {
        eprintln!("load failed: {err}");
        return;
    }
    for offset in [9_460u64, 9_470, 9_480, 9_490] {
        if let Ok(out) = page.on_scroll(offset, 10_000, 500).await {
            println!("offset={offset} {:?} fetch={}", out.transition, out.fetch_next);
        }
    }
    page.select_visible();
    println!("{:?}", page.view_state());

    page.on_filter_change("12");
    if let Some(Ok(meta)) = page.settle_query().await {
        let mut rows = Vec::new();
        page.collect_visible(&mut rows);
        println!("filtered: total={} rows={rows:?}", meta.total_count);
    }
}
