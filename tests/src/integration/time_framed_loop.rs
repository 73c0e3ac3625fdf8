//! # Time-Framed Transfer Loop
//!
//! Three agents share one clock. Over a full rotation each gets exactly
//! its own window, and never two at once.

#[cfg(test)]
mod tests {
    use ima_02_time_framing::{FixedTimeSource, FrameConfig, TimeFrameScheduler, TimeSource};
    use ima_03_transfer_loop::{
        CycleOutcome, ScriptedTransfer, TransferDirection, TransferLoop, TransferLoopError,
        TransferPort,
    };
    use std::sync::Arc;
    use std::time::Duration;

    const FRAME: u64 = 60;
    const GAP: u64 = 10;
    const NODES: u64 = 3;

    struct Node {
        transfer: Arc<ScriptedTransfer>,
        transfer_loop: Arc<TransferLoop>,
    }

    fn node(index: u64, clock: &Arc<FixedTimeSource>) -> Node {
        let transfer = Arc::new(ScriptedTransfer::new());
        let framing = TimeFrameScheduler::new(
            FrameConfig::new(index, NODES, FRAME, GAP),
            Arc::clone(clock) as Arc<dyn TimeSource>,
        )
        .unwrap();
        let transfer_loop = Arc::new(TransferLoop::new(
            Arc::clone(&transfer) as Arc<dyn TransferPort>,
            Arc::new(framing),
            Duration::from_secs(10),
        ));
        Node {
            transfer,
            transfer_loop,
        }
    }

    #[tokio::test]
    async fn test_rotation_gives_each_node_its_window() {
        let rotation_start = 180 * 10_000;
        let clock = Arc::new(FixedTimeSource::new(rotation_start));
        let nodes: Vec<Node> = (0..NODES).map(|i| node(i, &clock)).collect();

        for offset in (0..180).step_by(5) {
            clock.set(rotation_start + offset);
            let mut acting = Vec::new();
            for (index, node) in nodes.iter().enumerate() {
                if node.transfer_loop.run_once().await.unwrap() == CycleOutcome::Completed {
                    acting.push(index);
                }
            }
            assert!(acting.len() <= 1, "offset {}: {:?}", offset, acting);
            let owner = (offset / 60) as usize;
            let in_gap = offset % 60 >= 50;
            let expected: Vec<usize> = if in_gap { vec![] } else { vec![owner] };
            assert_eq!(acting, expected, "offset {}", offset);
        }

        for node in &nodes {
            let stats = node.transfer_loop.stats();
            // 12 samples per frame, 10 outside the gap
            assert_eq!(stats.completed, 10);
            assert_eq!(stats.skipped, 26);
            assert_eq!(node.transfer.calls().len(), 20);
        }
    }

    #[tokio::test]
    async fn test_failed_direction_does_not_block_the_other() {
        let clock = Arc::new(FixedTimeSource::new(180 * 10_000 + 65));
        let node = node(1, &clock);
        node.transfer.fail(TransferDirection::MainToSChain);

        let err = node.transfer_loop.run_once().await.unwrap_err();
        assert_eq!(
            err,
            TransferLoopError::TransferCycleFailed {
                failed: vec![TransferDirection::MainToSChain]
            }
        );
        assert_eq!(
            node.transfer.calls(),
            vec![TransferDirection::MainToSChain, TransferDirection::SChainToMain]
        );
        assert_eq!(node.transfer.error_log().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_forever_follows_the_clock() {
        let clock = Arc::new(FixedTimeSource::new(180 * 10_000));
        let node = node(2, &clock);
        let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
        let task = tokio::spawn(Arc::clone(&node.transfer_loop).run_forever(false, shutdown_rx));

        // first cycle at 0s: node 0's frame
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(node.transfer_loop.stats().skipped, 1);

        clock.set(180 * 10_000 + 125);
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(node.transfer_loop.stats().completed, 1);

        shutdown_tx.send(true).unwrap();
        task.await.unwrap();
        assert_eq!(node.transfer_loop.stats().cycles, 2);
    }
}
