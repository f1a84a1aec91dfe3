//! Reboot and reconfiguration sequencer tests
//!
//! Baud-rate changes and factory resets must reconfigure the local transport
//! strictly after the module acknowledges the reboot, and the restart wait
//! must honor an explicit probe budget.

mod common;

use common::MockTransport;
use embassy_futures::block_on;
use embassy_time::Duration;
use hm10_link::{Baudrate, DeviceLink, Error, RestartPolicy};

fn quick_policy(max_attempts: Option<u32>) -> RestartPolicy {
    RestartPolicy {
        settle: Duration::from_millis(10),
        poll_interval: Duration::from_millis(10),
        max_attempts,
    }
}

#[test]
fn baud_change_applies_only_after_the_reboot_ack() {
    block_on(async {
        let transport = MockTransport::new();
        let shared = transport.shared();
        transport.expect(b"OK+Set1");

        let mut link = DeviceLink::new(transport);
        link.start().unwrap();

        link.set_baudrate(Baudrate::Baud19200).await.unwrap();
        // Acknowledged but not applied: the link still runs at the old rate.
        assert_eq!(link.baudrate(), Baudrate::Baud9600);
        assert_eq!(link.pending_baudrate(), Baudrate::Baud19200);
        assert!(shared.borrow().bauds.is_empty());

        shared.borrow_mut().script.push_back(b"OK+RESET".to_vec());
        link.reboot(false).await.unwrap();

        assert_eq!(link.baudrate(), Baudrate::Baud19200);
        assert_eq!(link.pending_baudrate(), Baudrate::Baud19200);
        assert_eq!(shared.borrow().bauds, vec![19_200]);
    });
}

#[test]
fn reboot_without_pending_change_leaves_the_transport_alone() {
    block_on(async {
        let transport = MockTransport::new();
        let shared = transport.shared();
        transport.expect(b"OK+RESET");

        let mut link = DeviceLink::new(transport);
        link.start().unwrap();

        link.reboot(false).await.unwrap();
        assert!(shared.borrow().bauds.is_empty());
    });
}

#[test]
fn rejected_reset_does_not_touch_the_baud_rate() {
    block_on(async {
        let transport = MockTransport::new();
        let shared = transport.shared();
        transport.expect(b"OK+Set1");
        transport.expect(b"ERR");

        let mut link = DeviceLink::new(transport);
        link.start().unwrap();

        link.set_baudrate(Baudrate::Baud19200).await.unwrap();
        assert_eq!(
            link.reboot(false).await,
            Err(Error::UnexpectedResponse)
        );
        // No acknowledgment, no local reconfiguration.
        assert!(shared.borrow().bauds.is_empty());
        assert_eq!(link.baudrate(), Baudrate::Baud9600);
    });
}

#[test]
fn restart_wait_polls_until_the_module_answers() {
    block_on(async {
        let transport = MockTransport::new();
        let shared = transport.shared();
        transport.expect(b"OK+RESET");

        let mut link = DeviceLink::new(transport);
        link.start().unwrap();

        // The module answers the first probe after the settle delay.
        shared.borrow_mut().script.push_back(b"OK".to_vec());
        link.reboot_with(Some(quick_policy(Some(5)))).await.unwrap();

        let sent = shared.borrow();
        let probes = sent
            .sent
            .iter()
            .filter(|bytes| bytes.as_slice() == b"AT")
            .count();
        assert_eq!(probes, 1);
    });
}

#[test]
fn bounded_restart_wait_times_out() {
    block_on(async {
        let transport = MockTransport::new();
        transport.expect(b"OK+RESET");
        // No probe ever answers.

        let mut link = DeviceLink::new(transport);
        link.start().unwrap();

        assert_eq!(
            link.reboot_with(Some(quick_policy(Some(2)))).await,
            Err(Error::Timeout)
        );
    });
}

#[test]
fn factory_reset_restores_the_default_baud() {
    block_on(async {
        let transport = MockTransport::new();
        let shared = transport.shared();
        transport.expect(b"OK+Set1");

        let mut link = DeviceLink::new(transport);
        link.start().unwrap();

        // A pending 19200 change that will never be applied: the factory
        // reset wins and drops the link back to the default rate.
        link.set_baudrate(Baudrate::Baud19200).await.unwrap();

        shared.borrow_mut().script.push_back(b"OK+RENEW".to_vec());
        shared.borrow_mut().script.push_back(b"OK+RESET".to_vec());
        shared.borrow_mut().script.push_back(b"OK".to_vec());
        link.factory_reset().await.unwrap();

        assert_eq!(link.baudrate(), Baudrate::Baud9600);
        assert_eq!(link.pending_baudrate(), Baudrate::Baud9600);
        assert_eq!(shared.borrow().bauds, vec![9600]);
    });
}
