use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pretty_assertions::assert_eq;
use vlist_core::{Comparator, Element, Neighbor, Serial, Synthesizer};

use crate::driver::{spawn, DriverConfig};
use crate::output::UpdateKind;
use crate::request::PullDirection;

#[derive(Clone, Debug, PartialEq, Eq)]
struct Msg {
	key: String,
	tag: u32,
}

impl Element for Msg {
	fn serial(&self) -> Serial {
		Serial::new(self.key.clone())
	}
}

fn msg(key: &str) -> Msg {
	Msg { key: key.to_string(), tag: 0 }
}

fn msg_tagged(key: &str, tag: u32) -> Msg {
	Msg { key: key.to_string(), tag }
}

fn keys(elements: &[Msg]) -> Vec<String> {
	elements.iter().map(|m| m.key.clone()).collect()
}

fn comparator() -> Comparator<Msg> {
	Arc::new(|a: &Msg, b: &Msg| a.key < b.key)
}

fn identity_synthesizer() -> Synthesizer<Msg> {
	Arc::new(|_prev: Neighbor<'_, Msg>, curr: &Msg, _next: Neighbor<'_, Msg>| vec![curr.clone()])
}

/// Replays a fixed, ordered script of loader responses regardless of which
/// direction asked for them — the tests control ordering by the sequence
/// of requests they issue, not by direction-specific branching.
struct ScriptedLoader {
	responses: Mutex<VecDeque<Vec<Msg>>>,
	calls: Arc<AtomicUsize>,
}

fn scripted_loader(responses: Vec<Vec<Msg>>, calls: Arc<AtomicUsize>) -> crate::LoaderHook<Msg> {
	let script = Arc::new(ScriptedLoader {
		responses: Mutex::new(responses.into_iter().collect()),
		calls,
	});
	Arc::new(move |_direction: PullDirection, _anchor: Serial| {
		script.calls.fetch_add(1, Ordering::SeqCst);
		script.responses.lock().unwrap().pop_front().unwrap_or_default()
	})
}

fn config(max_size: usize, loader: crate::LoaderHook<Msg>) -> DriverConfig<Msg> {
	DriverConfig {
		comparator: comparator(),
		synthesizer: identity_synthesizer(),
		loader,
		invalidator: Arc::new(|| {}),
		max_size,
		request_capacity: 8,
		output_capacity: 8,
	}
}

async fn recv_update(output_rx: &mut tokio::sync::mpsc::Receiver<crate::StateUpdate<Msg>>) -> crate::StateUpdate<Msg> {
	tokio::time::timeout(Duration::from_secs(1), output_rx.recv())
		.await
		.expect("driver did not emit an update in time")
		.expect("driver closed its output channel")
}

async fn expect_no_update(output_rx: &mut tokio::sync::mpsc::Receiver<crate::StateUpdate<Msg>>) {
	let result = tokio::time::timeout(Duration::from_millis(100), output_rx.recv()).await;
	assert!(result.is_err(), "expected no update, but one was emitted");
}

#[tokio::test]
async fn scenario_1_empty_initial_pull() {
	let calls = Arc::new(AtomicUsize::new(0));
	let loader = scripted_loader(vec![vec![msg("007"), msg("008"), msg("009")]], Arc::clone(&calls));
	let (driver, mut output_rx) = spawn(config(100, loader));

	assert!(driver.try_pull(PullDirection::Before));
	let update = recv_update(&mut output_rx).await;

	assert_eq!(keys(update.synthesis.elements()), vec!["007", "008", "009"]);
	for key in ["007", "008", "009"] {
		assert!(update.synthesis.index_of(&Serial::new(key)).is_some());
	}
	assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn scenario_2_exhausted_direction_latches() {
	let calls = Arc::new(AtomicUsize::new(0));
	let loader = scripted_loader(
		vec![vec![msg("007"), msg("008"), msg("009")], vec![]],
		Arc::clone(&calls),
	);
	let (driver, mut output_rx) = spawn(config(100, loader));

	driver.try_pull(PullDirection::Before);
	recv_update(&mut output_rx).await;

	driver.try_pull(PullDirection::After);
	let update = recv_update(&mut output_rx).await;
	assert_eq!(update.synthesis.len(), 3);
	assert_eq!(calls.load(Ordering::SeqCst), 2);

	// A second `After` is discarded before ever reaching the loader.
	driver.try_pull(PullDirection::After);
	expect_no_update(&mut output_rx).await;
	assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn scenario_3_recovery_across_directions() {
	let calls = Arc::new(AtomicUsize::new(0));
	let loader = scripted_loader(
		vec![vec![msg("007"), msg("008"), msg("009")], vec![], vec![msg("004"), msg("005"), msg("006")], vec![]],
		Arc::clone(&calls),
	);
	let (driver, mut output_rx) = spawn(config(100, loader));

	driver.try_pull(PullDirection::Before);
	recv_update(&mut output_rx).await;
	driver.try_pull(PullDirection::After);
	recv_update(&mut output_rx).await;

	driver.try_pull(PullDirection::Before);
	let update = recv_update(&mut output_rx).await;
	assert_eq!(keys(update.synthesis.elements()), vec!["004", "005", "006", "007", "008", "009"]);

	// `After` was cleared by the successful `Before` load, so it reaches
	// the loader again even though this script answers it with `[]`.
	driver.try_pull(PullDirection::After);
	recv_update(&mut output_rx).await;
	assert_eq!(calls.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn scenario_4_compaction_centers_the_viewport() {
	let calls = Arc::new(AtomicUsize::new(0));
	let loader = scripted_loader(vec![], Arc::clone(&calls));
	let (driver, mut output_rx) = spawn(config(4, loader));

	let seed: Vec<Msg> = (1..=7).map(|n| msg(&format!("{n:03}"))).collect();
	driver.set_viewport(Serial::new("003"), Serial::new("004"));
	driver.modify(seed, Vec::new(), Vec::new()).await.unwrap();

	let update = recv_update(&mut output_rx).await;
	assert_eq!(keys(update.synthesis.elements()), vec!["002", "003", "004", "005"]);

	let mut compacted: Vec<String> = update
		.compacted_serials
		.iter()
		.map(|s| s.as_str().unwrap().to_string())
		.collect();
	compacted.sort();
	assert_eq!(compacted, vec!["001", "006", "007"]);
}

#[tokio::test]
async fn scenario_5_push_inside_window_updates_in_place() {
	let calls = Arc::new(AtomicUsize::new(0));
	let loader = scripted_loader(vec![], Arc::clone(&calls));
	let (driver, mut output_rx) = spawn(config(100, loader));

	driver
		.modify(vec![msg("003"), msg("004"), msg("005")], Vec::new(), Vec::new())
		.await
		.unwrap();
	recv_update(&mut output_rx).await;

	driver
		.modify(vec![msg_tagged("004", 1)], Vec::new(), Vec::new())
		.await
		.unwrap();
	let update = recv_update(&mut output_rx).await;

	assert_eq!(update.synthesis.len(), 3);
	assert_eq!(update.synthesis.elements()[1].tag, 1);
	assert!(matches!(update.kind, UpdateKind::Push));
	assert!(update.preserve_list_end);
}

#[tokio::test]
async fn scenario_6_push_outside_window_dropped_when_not_ignored() {
	let calls = Arc::new(AtomicUsize::new(0));
	let loader = scripted_loader(vec![], Arc::clone(&calls));
	let (driver, mut output_rx) = spawn(config(100, loader));

	driver
		.modify(vec![msg("003"), msg("004"), msg("005")], Vec::new(), Vec::new())
		.await
		.unwrap();
	recv_update(&mut output_rx).await;

	driver.modify(vec![msg("002")], Vec::new(), Vec::new()).await.unwrap();
	let update = recv_update(&mut output_rx).await;
	assert_eq!(keys(update.synthesis.elements()), vec!["003", "004", "005"]);
}

#[tokio::test]
async fn scenario_6_push_outside_window_accepted_when_direction_ignored() {
	let calls = Arc::new(AtomicUsize::new(0));
	// The `After` pull right after the seed returns empty, latching `After`
	// into the ignore set before the out-of-window push is attempted.
	let loader = scripted_loader(vec![vec![]], Arc::clone(&calls));
	let (driver, mut output_rx) = spawn(config(100, loader));

	driver
		.modify(vec![msg("003"), msg("004"), msg("005")], Vec::new(), Vec::new())
		.await
		.unwrap();
	recv_update(&mut output_rx).await;

	driver.try_pull(PullDirection::After);
	recv_update(&mut output_rx).await;

	driver.modify(vec![msg("100")], Vec::new(), Vec::new()).await.unwrap();
	let update = recv_update(&mut output_rx).await;
	assert_eq!(keys(update.synthesis.elements()), vec!["003", "004", "005", "100"]);
}
