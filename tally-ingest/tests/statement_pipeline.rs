use std::sync::Arc;

use tally_ingest::observer::{PageSkipReason, RecordingObserver};
use tally_ingest::{
    DecodedDocument, DocumentDecoder, Fragment, IngestError, ParseEvent, StatementInput,
    StatementSetAggregator, Transaction, parse_statement_page, reconstruct_rows,
};

/// A March statement page as the renderer reports it: fragments in content
/// stream order, not reading order.
fn march_page() -> Vec<Fragment> {
    vec![
        Fragment::new("Apple Card is issued by Goldman Sachs Bank USA", 36.0, 20.2),
        Fragment::new("$4.50", 552.1, 619.7),
        Fragment::new("Coffee Shop", 105.3, 620.1),
        Fragment::new("03/01/2024", 36.4, 620.0),
        Fragment::new("Purchases", 35.8, 650.0),
        Fragment::new("Statement", 36.0, 760.0),
        Fragment::new("Apple Card Customer", 36.0, 741.0),
        Fragment::new("Mar 1 - Mar 31, 2024", 36.0, 722.0),
        Fragment::new("Store #1234", 105.0, 606.0),
        Fragment::new("2%", 425.0, 580.0),
        Fragment::new("$0.40", 445.2, 580.0),
        Fragment::new("$19.99", 540.6, 580.0),
        Fragment::new("BOOKSTORE", 105.0, 580.0),
        Fragment::new("03/04/2024", 36.0, 580.0),
        Fragment::new("   ", 300.0, 580.0),
        Fragment::new("Page 2 of 3", 36.0, 40.0),
    ]
}

#[test]
fn test_page_from_fragments_to_transactions() {
    let rows = reconstruct_rows(&march_page());
    let txns = parse_statement_page(rows, 2, None);

    assert_eq!(txns.len(), 2);
    assert_eq!(
        txns[0],
        Transaction {
            date: "03/01/2024".to_string(),
            kind: Some("Purchases".to_string()),
            description: "Coffee Shop\nStore #1234".to_string(),
            daily_cash_percent: None,
            daily_cash_amount: None,
            amount: Some("$4.50".to_string()),
        }
    );
    assert_eq!(txns[1].description, "BOOKSTORE");
    assert_eq!(txns[1].kind.as_deref(), Some("Purchases"));
    assert_eq!(txns[1].daily_cash_percent.as_deref(), Some("2%"));
    assert_eq!(txns[1].daily_cash_amount.as_deref(), Some("$0.40"));
    assert_eq!(txns[1].amount.as_deref(), Some("$19.99"));

    for t in &txns {
        assert!(!t.date.is_empty());
        assert!(!t.description.is_empty());
    }
}

#[test]
fn test_serialized_records_carry_nulls_not_missing_keys() {
    let rows = reconstruct_rows(&march_page());
    let txns = parse_statement_page(rows, 2, None);

    let json = serde_json::to_value(&txns).unwrap();
    let first = json[0].as_object().unwrap();
    assert_eq!(first.len(), Transaction::COLUMNS.len());
    assert!(first["Daily Cash (%)"].is_null());
    assert!(first["Daily Cash ($)"].is_null());
}

#[test]
fn test_page_with_two_rows_is_skipped() {
    let frags = vec![
        Fragment::new("Statement", 36.0, 760.0),
        Fragment::new("Apple Card Customer", 36.0, 740.0),
    ];
    let obs = RecordingObserver::default();
    let txns = parse_statement_page(reconstruct_rows(&frags), 7, Some(&obs));

    assert!(txns.is_empty());
    assert_eq!(
        obs.events(),
        vec![ParseEvent::PageSkipped {
            page: 7,
            reason: PageSkipReason::TooFewRows
        }]
    );
}

struct StubDecoder;

struct StubDocument {
    pages: Vec<Vec<Fragment>>,
}

impl DecodedDocument for StubDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_fragments(&self, index: usize) -> tally_ingest::Result<Vec<Fragment>> {
        Ok(self.pages[index].clone())
    }
}

impl DocumentDecoder for StubDecoder {
    type Document = StubDocument;

    fn decode(&self, bytes: &[u8]) -> tally_ingest::Result<StubDocument> {
        match bytes {
            b"march" => Ok(StubDocument {
                pages: vec![vec![Fragment::new("Welcome", 36.0, 700.0)], march_page()],
            }),
            _ => Err(IngestError::Decode("unknown fixture".to_string())),
        }
    }
}

#[tokio::test]
async fn test_aggregator_reports_events_and_sorts() {
    let obs = Arc::new(RecordingObserver::default());
    let agg = StatementSetAggregator::new(StubDecoder).with_observer(obs.clone());

    let txns = agg
        .parse(StatementInput::Many(vec![b"march".to_vec(), b"march".to_vec()]))
        .await
        .unwrap();

    let dates: Vec<_> = txns.iter().map(|t| t.date.as_str()).collect();
    assert_eq!(dates, vec!["03/01/2024", "03/01/2024", "03/04/2024", "03/04/2024"]);

    let parsed_pages = obs
        .events()
        .into_iter()
        .filter(|e| matches!(e, ParseEvent::PageParsed { page: 2, transactions: 2 }))
        .count();
    assert_eq!(parsed_pages, 2);
}

#[tokio::test]
async fn test_unknown_document_fails_whole_call() {
    let agg = StatementSetAggregator::new(StubDecoder);
    let err = agg
        .parse(StatementInput::Many(vec![b"march".to_vec(), b"scan".to_vec()]))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("unknown fixture"));
}
