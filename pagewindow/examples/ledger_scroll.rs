// Example: drive the loader and the page window by hand, the way an adapter would.
use pagewindow::{Filters, LoaderState, Page, PagerOptions, ScrollSample, WindowController};

fn serve(all: &[u32], page: usize, page_size: usize) -> Page<u32> {
    let start = ((page - 1) * page_size).min(all.len());
    let end = (page * page_size).min(all.len());
    Page {
        data: all[start..end].to_vec(),
        total: all.len(),
        has_more: end < all.len(),
    }
}

fn main() {
    let ledger: Vec<u32> = (1..=130).collect();
    let options = PagerOptions::new(|r: &u32| *r).with_page_size(40);
    let mut window = WindowController::new(options.window);
    let mut loader = LoaderState::new(options);

    let req = loader.begin_reset(Filters::new());
    loader.complete(&req, serve(&ledger, req.page, req.page_size));
    window.sync(&loader.meta());

    for offset in [2_000u64, 9_460, 9_470, 9_480, 9_490, 3_000, 0] {
        let out = window.on_scroll(
            ScrollSample::new(offset, 10_000, 500),
            &loader.meta(),
            loader.is_fetching(),
        );
        if out.fetch_next {
            if let Some(req) = loader.begin_next() {
                loader.complete(&req, serve(&ledger, req.page, req.page_size));
                window.sync(&loader.meta());
            }
        }
        let meta = loader.meta();
        println!(
            "offset={offset} {:?} window={:?} visible={:?} loaded={}/{}",
            out.transition,
            window.window(),
            window.visible_range(&meta, loader.len()),
            meta.pages_loaded,
            meta.total_pages(),
        );
    }
}
