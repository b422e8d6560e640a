use crate::*;

use alloc::string::ToString;
use alloc::vec::Vec;

#[derive(Clone, Copy, Debug)]
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u64(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0
    }

    fn gen_range_u64(&mut self, start: u64, end_exclusive: u64) -> u64 {
        debug_assert!(start < end_exclusive);
        let span = end_exclusive - start;
        start + (self.next_u64() % span)
    }

    fn gen_bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }
}

fn ledger(n: u32) -> Vec<u32> {
    (1..=n).collect()
}

fn page_of(all: &[u32], page: usize, page_size: usize) -> Page<u32> {
    let start = ((page - 1) * page_size).min(all.len());
    let end = (page * page_size).min(all.len());
    Page {
        data: all[start..end].to_vec(),
        total: all.len(),
        has_more: end < all.len(),
    }
}

fn options(page_size: usize) -> PagerOptions<u32, u32> {
    PagerOptions::new(|r: &u32| *r).with_page_size(page_size)
}

fn loaded(all: &[u32], page_size: usize, pages: usize) -> LoaderState<u32, u32> {
    let mut loader = LoaderState::new(options(page_size));
    let req = loader.begin_reset(Filters::new());
    assert!(matches!(
        loader.complete(&req, page_of(all, req.page, req.page_size)),
        Completion::Applied(_)
    ));
    for _ in 1..pages {
        let req = loader.begin_next().unwrap();
        loader.complete(&req, page_of(all, req.page, req.page_size));
    }
    loader
}

fn assert_window_invariants(w: &WindowController, meta: &PageMeta) {
    let window = w.window();
    if meta.pages_loaded == 0 {
        assert!(window.is_empty());
        return;
    }
    assert!(1 <= window.start_page, "{window:?}");
    assert!(window.start_page <= window.end_page, "{window:?}");
    assert!(window.end_page <= meta.pages_loaded, "{window:?} {meta:?}");
    assert!(window.pages() <= w.window_size(), "{window:?}");
}

#[test]
fn reset_loads_first_page() {
    let all = ledger(130);
    let loader = loaded(&all, 40, 1);
    let meta = loader.meta();
    assert_eq!(meta.pages_loaded, 1);
    assert_eq!(meta.total_count, 130);
    assert!(meta.has_more);
    assert_eq!(meta.total_pages(), 4);
    assert_eq!(loader.records(), &all[..40]);
}

#[test]
fn appends_are_ordered_without_gaps_or_duplicates() {
    let all = ledger(130);
    let loader = loaded(&all, 40, 4);
    assert_eq!(loader.records(), &all[..]);
    let meta = loader.meta();
    assert_eq!(meta.pages_loaded, 4);
    assert!(!meta.has_more);
    assert!(meta.pages_loaded * meta.page_size >= loader.len());
}

#[test]
fn begin_next_is_single_flight() {
    let all = ledger(130);
    let mut loader = loaded(&all, 40, 1);
    let first = loader.begin_next().unwrap();
    assert_eq!(first.page, 2);
    assert!(loader.is_fetching());
    assert!(loader.begin_next().is_none());

    loader.complete(&first, page_of(&all, first.page, first.page_size));
    assert_eq!(loader.meta().pages_loaded, 2);
    assert_eq!(loader.len(), 80);
}

#[test]
fn begin_next_is_noop_without_more_pages() {
    let all = ledger(30);
    let mut loader = loaded(&all, 40, 1);
    assert!(!loader.meta().has_more);
    assert!(loader.begin_next().is_none());

    let mut fresh: LoaderState<u32, u32> = LoaderState::new(options(40));
    assert!(fresh.begin_next().is_none());
}

#[test]
fn stale_reset_response_is_discarded() {
    let all = ledger(130);
    let mut loader = LoaderState::new(options(40));
    let mut a = Filters::new();
    a.insert("q".to_string(), "a".to_string());
    let mut b = Filters::new();
    b.insert("q".to_string(), "b".to_string());

    let first = loader.begin_reset(a);
    let second = loader.begin_reset(b.clone());
    assert!(second.generation > first.generation);

    assert_eq!(
        loader.complete(&first, page_of(&all, 1, 40)),
        Completion::Stale
    );
    assert!(loader.is_empty());
    assert!(loader.is_resetting());

    let applied = loader.complete(&second, page_of(&all[..50], 1, 40));
    assert!(matches!(applied, Completion::Applied(m) if m.total_count == 50));
    assert_eq!(loader.filters(), &b);
}

#[test]
fn next_page_for_previous_filter_is_stale() {
    let all = ledger(130);
    let mut loader = loaded(&all, 40, 1);
    let next = loader.begin_next().unwrap();
    let reset = loader.begin_reset(Filters::new());

    assert_eq!(
        loader.complete(&next, page_of(&all, next.page, 40)),
        Completion::Stale
    );
    assert_eq!(loader.fail(&next), Completion::Stale);
    loader.complete(&reset, page_of(&all, 1, 40));
    assert_eq!(loader.records(), &all[..40]);
}

#[test]
fn failed_next_leaves_sequence_and_allows_retry() {
    let all = ledger(130);
    let mut loader = loaded(&all, 40, 2);
    let before = loader.meta();

    let req = loader.begin_next().unwrap();
    assert_eq!(loader.fail(&req), Completion::Failed);
    assert_eq!(loader.meta(), before);
    assert_eq!(loader.len(), 80);
    assert!(!loader.is_fetching());

    let retry = loader.begin_next().unwrap();
    assert_eq!(retry.page, 3);
}

#[test]
fn failed_reset_leaves_sequence_empty() {
    let all = ledger(130);
    let mut loader = loaded(&all, 40, 3);
    let req = loader.begin_reset(Filters::new());
    assert_eq!(loader.fail(&req), Completion::Failed);
    assert!(loader.is_empty());
    assert_eq!(loader.meta().pages_loaded, 0);
    assert!(loader.begin_next().is_none());
}

#[test]
fn duplicate_records_are_skipped_on_append() {
    let mut loader = LoaderState::new(options(3));
    let req = loader.begin_reset(Filters::new());
    loader.complete(
        &req,
        Page {
            data: vec![1, 2, 3],
            total: 6,
            has_more: true,
        },
    );
    let req = loader.begin_next().unwrap();
    loader.complete(
        &req,
        Page {
            data: vec![3, 4, 5],
            total: 6,
            has_more: true,
        },
    );
    assert_eq!(loader.records(), &[1, 2, 3, 4, 5]);
    assert!(loader.contains_key(&4));
    assert!(loader.meta().has_more);
}

#[test]
fn oversized_page_is_truncated() {
    let mut loader = LoaderState::new(options(2));
    let req = loader.begin_reset(Filters::new());
    loader.complete(
        &req,
        Page {
            data: vec![1, 2, 3],
            total: 10,
            has_more: true,
        },
    );
    assert_eq!(loader.records(), &[1, 2]);
    let meta = loader.meta();
    assert!(meta.pages_loaded * meta.page_size >= loader.len());
}

#[test]
fn server_has_more_false_wins() {
    let mut loader = LoaderState::new(options(40));
    let req = loader.begin_reset(Filters::new());
    loader.complete(
        &req,
        Page {
            data: vec![1, 2],
            total: 90,
            has_more: false,
        },
    );
    assert!(!loader.meta().has_more);
    assert!(loader.begin_next().is_none());
}

#[test]
fn first_sync_opens_initial_window() {
    let all = ledger(130);
    let loader = loaded(&all, 40, 1);
    let mut w = WindowController::default();
    assert!(w.window().is_empty());
    assert_eq!(w.visible_range(&loader.meta(), loader.len()), 0..0);
    assert_eq!(w.sync(&loader.meta()), Window::new(1, 1));
    assert_eq!(w.visible_range(&loader.meta(), loader.len()), 0..40);
}

#[test]
fn scroll_to_bottom_fetches_until_exhausted_then_shifts() {
    // pageSize=40, window=3, total=130 => 4 pages.
    let all = ledger(130);
    let mut loader = loaded(&all, 40, 1);
    let mut w = WindowController::default();
    w.sync(&loader.meta());

    let mut fetches = 0;
    for offset in [9_460u64, 9_470, 9_480, 9_490] {
        let out = w.on_scroll(
            ScrollSample::new(offset, 10_000, 500),
            &loader.meta(),
            loader.is_fetching(),
        );
        assert_eq!(out.direction, ScrollDirection::Down);
        if out.fetch_next {
            fetches += 1;
            let req = loader.begin_next().unwrap();
            loader.complete(&req, page_of(&all, req.page, req.page_size));
            w.sync(&loader.meta());
        }
        assert_window_invariants(&w, &loader.meta());
    }

    assert_eq!(fetches, 3);
    let meta = loader.meta();
    assert_eq!(meta.pages_loaded, 4);
    assert!(!meta.has_more);
    assert_eq!(w.window(), Window::new(2, 4));
    let visible = w.visible_range(&meta, loader.len());
    assert_eq!(visible, 40..130);
    assert_eq!(visible.len(), 90);
}

#[test]
fn window_follows_pages_loaded_at_the_tail() {
    // 100 pages, but only 40 rows rendered: the estimate stays far past the loaded pages.
    let all = ledger(4_000);
    let mut loader = loaded(&all, 40, 1);
    let mut w = WindowController::default();
    w.sync(&loader.meta());

    let mut windows = Vec::new();
    for offset in [1_460u64, 1_470, 1_480, 1_490, 1_500] {
        let out = w.on_scroll(
            ScrollSample::new(offset, 2_000, 500),
            &loader.meta(),
            loader.is_fetching(),
        );
        assert!(out.fetch_next);
        let req = loader.begin_next().unwrap();
        loader.complete(&req, page_of(&all, req.page, req.page_size));
        windows.push(w.sync(&loader.meta()));
        assert_window_invariants(&w, &loader.meta());
    }

    assert_eq!(
        windows,
        [
            Window::new(1, 2),
            Window::new(1, 3),
            Window::new(2, 4),
            Window::new(3, 5),
            Window::new(4, 6),
        ]
    );
    assert_eq!(loader.meta().pages_loaded, 6);
    assert_eq!(w.visible_range(&loader.meta(), loader.len()), 120..240);
}

#[test]
fn sync_keeps_window_away_from_the_tail() {
    let all = ledger(400);
    let mut loader = loaded(&all, 40, 5);
    let mut w = WindowController::default();
    w.sync(&loader.meta());
    w.jump_to_page(2, &loader.meta());
    assert_eq!(w.window(), Window::new(1, 3));

    let req = loader.begin_next().unwrap();
    loader.complete(&req, page_of(&all, req.page, req.page_size));
    assert_eq!(w.sync(&loader.meta()), Window::new(1, 3));
}

#[test]
fn huge_window_size_saturates() {
    let all = ledger(400);
    let loader = loaded(&all, 40, 5);
    let meta = loader.meta();
    let mut w = WindowController::new(WindowOptions::default().with_window_size(usize::MAX));
    assert_eq!(w.sync(&meta), Window::new(1, 5));
    assert_eq!(w.jump_to_page(3, &meta), Window::new(1, 5));
    w.on_scroll(ScrollSample::new(9_000, 10_000, 500), &meta, false);
    w.on_scroll(ScrollSample::new(3_000, 10_000, 500), &meta, false);
    assert_window_invariants(&w, &meta);
    assert_eq!(w.visible_range(&meta, loader.len()), 0..200);
}

#[test]
fn near_end_does_not_fetch_while_in_flight() {
    let all = ledger(130);
    let loader = loaded(&all, 40, 1);
    let mut w = WindowController::default();
    w.sync(&loader.meta());

    let out = w.on_scroll(ScrollSample::new(9_460, 10_000, 500), &loader.meta(), true);
    assert!(!out.fetch_next);

    let out = w.on_scroll(ScrollSample::new(9_470, 10_000, 500), &loader.meta(), false);
    assert!(out.fetch_next);

    // Far from the end.
    let out = w.on_scroll(ScrollSample::new(9_000, 20_000, 500), &loader.meta(), false);
    assert_eq!(out.direction, ScrollDirection::Up);
    assert!(!out.fetch_next);
}

#[test]
fn snap_to_start_is_idempotent() {
    let all = ledger(400);
    let loader = loaded(&all, 40, 6);
    let meta = loader.meta();
    let mut w = WindowController::default();
    w.sync(&meta);
    w.on_scroll(ScrollSample::new(4_750, 10_000, 500), &meta, false);
    assert_eq!(w.window(), Window::new(3, 5));

    for _ in 0..5 {
        let out = w.on_scroll(ScrollSample::new(0, 10_000, 500), &meta, false);
        assert_eq!(out.transition, Transition::SnapToStart);
        assert_eq!(w.window(), Window::new(1, 3));
    }
}

#[test]
fn snap_respects_loaded_pages() {
    let all = ledger(400);
    let loader = loaded(&all, 40, 2);
    let mut w = WindowController::default();
    w.sync(&loader.meta());
    w.on_scroll(ScrollSample::new(0, 10_000, 500), &loader.meta(), false);
    assert_eq!(w.window(), Window::new(1, 2));
}

#[test]
fn scrolling_up_shifts_window_back() {
    let all = ledger(130);
    let loader = loaded(&all, 40, 4);
    let meta = loader.meta();
    let mut w = WindowController::default();
    w.sync(&meta);
    w.on_scroll(ScrollSample::new(9_490, 10_000, 500), &meta, false);
    assert_eq!(w.window(), Window::new(2, 4));

    // 20% => estimated page ceil(0.8) = 1.
    let out = w.on_scroll(ScrollSample::new(1_900, 10_000, 500), &meta, false);
    assert_eq!(out.direction, ScrollDirection::Up);
    assert_eq!(out.transition, Transition::ShiftUp);
    assert!(out.changed);
    assert_eq!(w.window(), Window::new(1, 3));
}

#[test]
fn shift_down_waits_for_loaded_pages() {
    let all = ledger(400);
    let loader = loaded(&all, 40, 2);
    let meta = loader.meta();
    let mut w = WindowController::default();
    w.sync(&meta);

    // Estimated page 5 of 10 is not loaded yet.
    let out = w.on_scroll(ScrollSample::new(4_750, 10_000, 500), &meta, false);
    assert_eq!(out.transition, Transition::Unchanged);
    assert_eq!(w.window(), Window::new(1, 2));
}

#[test]
fn unscrollable_content_keeps_first_pages() {
    let all = ledger(10);
    let loader = loaded(&all, 40, 1);
    let mut w = WindowController::default();
    w.sync(&loader.meta());
    let out = w.on_scroll(ScrollSample::new(0, 300, 500), &loader.meta(), false);
    assert_eq!(out.window, Window::new(1, 1));
    assert_eq!(estimated_page(ScrollSample::new(0, 300, 500), 1), 0);
    assert_eq!(scroll_fraction(ScrollSample::new(10, 300, 500)), 0.0);
}

#[test]
fn sync_clamps_window_after_shrink() {
    let all = ledger(400);
    let loader = loaded(&all, 40, 8);
    let mut w = WindowController::default();
    w.sync(&loader.meta());
    w.jump_to_page(7, &loader.meta());
    assert_eq!(w.window(), Window::new(6, 8));

    let smaller = PageMeta {
        pages_loaded: 4,
        ..loader.meta()
    };
    assert_eq!(w.sync(&smaller), Window::new(4, 4));
    w.reset();
    assert!(w.window().is_empty());
}

#[test]
fn jump_to_page_clamps_to_loaded() {
    let all = ledger(400);
    let loader = loaded(&all, 40, 5);
    let meta = loader.meta();
    let mut w = WindowController::default();
    assert_eq!(w.jump_to_page(1, &meta), Window::new(1, 3));
    assert_eq!(w.jump_to_page(99, &meta), Window::new(3, 5));
    assert_eq!(w.jump_to_page(3, &meta), Window::new(2, 4));
}

#[test]
fn window_invariants_hold_under_random_scrolling() {
    let all = ledger(1_000);
    for seed in 1..=8u64 {
        let mut rng = Lcg::new(seed);
        let page_size = rng.gen_range_u64(5, 60) as usize;
        let window_size = rng.gen_range_u64(1, 5) as usize;
        let mut loader = loaded(&all, page_size, 1);
        let mut w = WindowController::new(WindowOptions::default().with_window_size(window_size));
        w.sync(&loader.meta());

        for _ in 0..400 {
            let extent = rng.gen_range_u64(1, 50_000);
            let client = rng.gen_range_u64(1, 2_000) as u32;
            let offset = rng.gen_range_u64(0, extent + 100);
            let out = w.on_scroll(
                ScrollSample::new(offset, extent, client),
                &loader.meta(),
                loader.is_fetching(),
            );
            assert_window_invariants(&w, &loader.meta());
            if out.fetch_next && rng.gen_bool() {
                if let Some(req) = loader.begin_next() {
                    loader.complete(&req, page_of(&all, req.page, req.page_size));
                }
                w.sync(&loader.meta());
                assert_window_invariants(&w, &loader.meta());
            }
            let range = w.visible_range(&loader.meta(), loader.len());
            assert!(range.end <= loader.len());
            assert!(range.len() <= window_size * page_size);
        }
    }
}

#[test]
fn default_policy_classifies_input() {
    assert_eq!(classify_default("ab", 3), InputClass::TooShort);
    assert_eq!(classify_default("  ab  ", 3), InputClass::TooShort);
    assert_eq!(classify_default("", 3), InputClass::TooShort);
    assert_eq!(classify_default("asp", 3), InputClass::Debounced);
    assert_eq!(classify_default("7", 3), InputClass::Immediate);
    assert_eq!(classify_default("500123456", 3), InputClass::Immediate);
    assert_eq!(classify_default("12a", 3), InputClass::Debounced);
}

#[test]
fn short_input_clears() {
    let mut d = Debouncer::new(QueryOptions::default());
    d.on_input("aspirin", 0);
    assert!(d.is_pending());
    assert_eq!(d.on_input("ab", 10), InputDecision::Cleared);
    assert!(!d.is_pending());
    assert_eq!(d.poll(10_000), None);
}

#[test]
fn debounced_input_settles_after_delay() {
    let mut d = Debouncer::new(QueryOptions::default());
    assert_eq!(
        d.on_input("aspi", 0),
        InputDecision::Scheduled { due_ms: 1_000 }
    );
    assert_eq!(
        d.on_input("aspirin", 500),
        InputDecision::Scheduled { due_ms: 1_500 }
    );
    assert_eq!(d.poll(1_000), None);
    let q = d.poll(1_500).unwrap();
    assert_eq!(q.text, "aspirin");
    assert_eq!(q.origin, QueryOrigin::Typed);
    assert_eq!(d.poll(3_000), None);
}

#[test]
fn numeric_code_bypasses_debounce() {
    let mut d = Debouncer::new(QueryOptions::default());
    d.on_input("asp", 0);
    match d.on_input("500123456", 10) {
        InputDecision::Dispatch(q) => assert_eq!(q.text, "500123456"),
        other => panic!("expected immediate dispatch, got {other:?}"),
    }
    assert!(!d.is_pending());
}

#[test]
fn scan_cancels_pending_input() {
    let mut d = Debouncer::new(QueryOptions::default());
    d.on_input("aspirin", 0);
    let q = d.on_scan(" 7501 ");
    assert_eq!(q, Query::new("7501", QueryOrigin::Scan));
    assert_eq!(d.poll(5_000), None);
}

#[test]
fn custom_policy_and_min_len() {
    let mut d = Debouncer::new(QueryOptions::default().with_min_len(5).with_debounce_ms(200));
    assert_eq!(d.on_input("aspi", 0), InputDecision::Cleared);
    assert_eq!(
        d.on_input("aspir", 0),
        InputDecision::Scheduled { due_ms: 200 }
    );

    let mut d = Debouncer::new(QueryOptions::default().with_policy(|text: &str| {
        if text.starts_with("GR-") {
            InputClass::Immediate
        } else {
            InputClass::Debounced
        }
    }));
    assert!(matches!(d.on_input("GR-1", 0), InputDecision::Dispatch(_)));
    assert!(matches!(
        d.on_input("12345", 0),
        InputDecision::Scheduled { .. }
    ));
}

#[test]
fn epoch_gate_accepts_only_latest() {
    let mut gate = EpochGate::new();
    let first = gate.advance();
    let second = gate.advance();
    assert!(second > first);
    assert!(!gate.is_current(first));
    assert!(gate.is_current(second));
    gate.invalidate();
    assert!(!gate.is_current(second));
}

#[test]
fn resident_filter_caps_results() {
    let rows: Vec<u32> = (0..500).collect();
    let mut f = ResidentFilter::new(rows, 100, |r: &u32, q: &str| r.to_string().contains(q));
    assert_eq!(f.hits().len(), 100);

    let hits = f.apply("1").to_vec();
    assert_eq!(hits.len(), 100);
    assert_eq!(hits[0], 1);
    assert!(hits.windows(2).all(|w| w[0] < w[1]));

    let hits = f.apply(" 499 ").to_vec();
    assert_eq!(hits, vec![499]);
    assert_eq!(f.query(), "499");

    let mut out = Vec::new();
    f.collect_hits(&mut out);
    assert_eq!(out, vec![499]);

    f.set_records(vec![1, 2, 3]);
    assert!(f.hits().is_empty());
    f.apply("");
    assert_eq!(f.hits(), &[0, 1, 2]);
}

#[test]
fn selection_is_keyed_by_identity() {
    let mut s = SelectionSet::new();
    assert!(s.toggle(10u32));
    assert!(s.contains(&10));
    assert!(!s.toggle(10));
    assert!(s.is_empty());

    s.select_all([1, 2, 3]);
    assert!(!s.select(2));
    assert_eq!(s.len(), 3);
    assert!(s.deselect(&1));
    s.clear();
    assert!(s.is_empty());
}
