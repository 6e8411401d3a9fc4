//! Journal integration: persistence, edits, CSV import/export, statistics.

use chrono::NaiveDate;
use tradelab_core::{
    Config, Direction, Journal, JournalError, JournalStats, Market, TradeCalculator, TradeEntry,
    TradeFields,
};

fn entry(day: u32, symbol: &str, direction: Direction, entry: f64, exit: Option<f64>) -> TradeEntry {
    TradeEntry::new(TradeFields {
        date: NaiveDate::from_ymd_opt(2024, 4, day).unwrap(),
        symbol: symbol.into(),
        market: Market::Stocks,
        direction,
        entry_price: entry,
        exit_price: exit,
        quantity: 100.0,
        notes: Some("journal test".into()),
    })
    .unwrap()
}

fn calculator() -> TradeCalculator {
    TradeCalculator::with_default_ticks()
}

#[test]
fn trades_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("journal.jsonl");

    let id = {
        let mut journal = Journal::open(&path, calculator()).unwrap();
        assert!(journal.is_empty());
        journal.add(entry(1, "AAPL", Direction::Long, 150.0, Some(155.0))).unwrap()
    };

    let journal = Journal::open(&path, calculator()).unwrap();
    assert_eq!(journal.len(), 1);
    let trade = journal.get(&id).unwrap();
    assert_eq!(trade.profit_loss(), Some(500.0));
    assert_eq!(trade.entry().notes(), Some("journal test"));
}

#[test]
fn reopen_recomputes_with_current_tick_table() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("journal.jsonl");

    let es = TradeEntry::new(TradeFields {
        date: NaiveDate::from_ymd_opt(2024, 4, 2).unwrap(),
        symbol: "ES".into(),
        market: Market::Futures,
        direction: Direction::Long,
        entry_price: 5000.0,
        exit_price: Some(5001.0),
        quantity: 1.0,
        notes: None,
    })
    .unwrap();
    let id = Journal::open(&path, calculator()).unwrap().add(es).unwrap();

    let overridden = Config::from_toml(
        "[ticks.overrides]\nES = { tick_size = 0.25, tick_value = 50.0 }\n",
    )
    .unwrap()
    .calculator()
    .unwrap();
    let journal = Journal::open(&path, overridden).unwrap();
    // 4 ticks × $50 instead of 4 ticks × $12.50
    assert_eq!(journal.get(&id).unwrap().profit_loss(), Some(200.0));
}

#[test]
fn update_recomputes_and_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("journal.jsonl");
    let mut journal = Journal::open(&path, calculator()).unwrap();

    let open_id = journal.add(entry(2, "TSLA", Direction::Short, 200.0, None)).unwrap();
    assert!(journal.get(&open_id).unwrap().is_open());

    let mut fields = journal.get(&open_id).unwrap().entry().clone().into_fields();
    fields.exit_price = Some(195.0);
    let closed_id = journal.update(&open_id, TradeEntry::new(fields).unwrap()).unwrap();

    assert_ne!(closed_id, open_id);
    assert!(journal.get(&open_id).is_none());
    let closed = journal.get(&closed_id).unwrap();
    assert_eq!(closed.profit_loss(), Some(500.0));
    assert_eq!(closed.metrics().max_runup, Some(500.0));

    let reopened = Journal::open(&path, calculator()).unwrap();
    assert_eq!(reopened.len(), 1);
    assert!(reopened.get(&closed_id).is_some());
}

#[test]
fn update_rejects_collision_with_existing_trade() {
    let dir = tempfile::tempdir().unwrap();
    let mut journal = Journal::open(dir.path().join("journal.jsonl"), calculator()).unwrap();
    let first = entry(3, "MSFT", Direction::Long, 400.0, Some(410.0));
    journal.add(first.clone()).unwrap();
    let second_id = journal.add(entry(3, "MSFT", Direction::Long, 400.0, Some(420.0))).unwrap();

    assert!(matches!(journal.update(&second_id, first), Err(JournalError::Duplicate(_))));
    assert_eq!(journal.len(), 2);
}

#[test]
fn delete_removes_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("journal.jsonl");
    let mut journal = Journal::open(&path, calculator()).unwrap();
    let keep = journal.add(entry(1, "AMD", Direction::Long, 100.0, Some(110.0))).unwrap();
    let gone = journal.add(entry(2, "INTC", Direction::Long, 30.0, Some(28.0))).unwrap();

    let removed = journal.delete(&gone).unwrap();
    assert_eq!(removed.entry().symbol(), "INTC");
    assert!(matches!(journal.delete(&gone), Err(JournalError::NotFound(_))));

    let reopened = Journal::open(&path, calculator()).unwrap();
    assert_eq!(reopened.len(), 1);
    assert!(reopened.get(&keep).is_some());
    assert!(!dir.path().join("journal.jsonl.tmp").exists());
}

#[test]
fn csv_import_reports_bad_rows_and_skips_duplicates() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("journal.jsonl");
    let mut journal = Journal::open(&path, calculator()).unwrap();
    journal.add(entry(1, "AAPL", Direction::Long, 150.0, Some(155.0))).unwrap();

    let csv = "\
date,symbol,market,direction,entry_price,exit_price,quantity,notes
2024-04-01,AAPL,Stocks,Long,150,155,100,journal test
2024-04-02,es,futures,long,5000,5000.30,2,
2024-04-03,TSLA,Stocks,Sideways,200,195,50,
2024-04-04,NVDA,Stocks,Long,abc,,5,
2024-04-05,NVDA,Stocks,Long,900,,5,still open
2024-04-05,NVDA,Stocks,Long,900,,5,still open
";
    let report = journal.import_csv(csv.as_bytes()).unwrap();

    assert_eq!(report.imported, 2);
    assert_eq!(report.duplicates, 2);
    let bad_lines: Vec<usize> = report.rejected.iter().map(|r| r.line).collect();
    assert_eq!(bad_lines, vec![4, 5]);
    assert!(report.rejected[0].message.contains("Sideways"));

    let reopened = Journal::open(&path, calculator()).unwrap();
    assert_eq!(reopened.len(), 3);
    let es = reopened.trades().into_iter().find(|t| t.entry().symbol() == "ES").unwrap();
    // 0.30 → 1 tick × $12.50 × 2 contracts
    assert_eq!(es.profit_loss(), Some(25.0));
}

#[test]
fn csv_export_roundtrips_through_import() {
    let dir = tempfile::tempdir().unwrap();
    let mut journal = Journal::open(dir.path().join("a.jsonl"), calculator()).unwrap();
    journal.add(entry(1, "AAPL", Direction::Long, 150.0, Some(155.0))).unwrap();
    journal.add(entry(2, "TSLA", Direction::Short, 200.0, None)).unwrap();

    let mut buf = Vec::new();
    assert_eq!(journal.export_csv(&mut buf).unwrap(), 2);
    let text = String::from_utf8(buf.clone()).unwrap();
    assert!(text.starts_with("id,date,symbol,market,direction,entry_price"));

    let mut copy = Journal::open(dir.path().join("b.jsonl"), calculator()).unwrap();
    let report = copy.import_csv(buf.as_slice()).unwrap();
    assert_eq!(report.imported, 2);
    assert!(report.rejected.is_empty());

    let original: Vec<_> = journal.trades().iter().map(|t| t.id().clone()).collect();
    let imported: Vec<_> = copy.trades().iter().map(|t| t.id().clone()).collect();
    assert_eq!(original, imported);
}

#[test]
fn stats_over_journal() {
    let dir = tempfile::tempdir().unwrap();
    let mut journal = Journal::open(dir.path().join("journal.jsonl"), calculator()).unwrap();
    journal.add(entry(1, "AAPL", Direction::Long, 150.0, Some(155.0))).unwrap(); // +500
    journal.add(entry(2, "TSLA", Direction::Short, 200.0, Some(195.0))).unwrap(); // +500
    journal.add(entry(3, "MSFT", Direction::Long, 400.0, Some(398.0))).unwrap(); // -200
    journal.add(entry(4, "NVDA", Direction::Long, 900.0, None)).unwrap();

    let stats = JournalStats::compute(journal.trades());
    assert_eq!(stats.total_trades, 4);
    assert_eq!(stats.open_trades, 1);
    assert_eq!(stats.total_pnl, 800.0);
    assert_eq!(stats.profit_factor, 5.0);
    assert_eq!(stats.max_consecutive_wins, 2);
    assert_eq!(stats.max_pnl_drawdown, -200.0);
    // 800 / (15000 + 20000 + 40000)
    assert_eq!(stats.return_on_investment, 1.07);
}
