//! Live link monitoring.
//!
//! Subscribes to rtnetlink link notifications and turns `RTM_NEWLINK` and
//! `RTM_DELLINK` into [`LinkEvent`]s for the event loop. The netlink socket
//! is blocking, so it is read on a dedicated thread that feeds a channel;
//! the forwarding half is an ordinary stream consumer.

use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use futures::{Stream, StreamExt};
use log::{debug, warn};
use neli::consts::rtnl::Rtm;
use neli::consts::socket::NlFamily;
use neli::nl::Nlmsghdr;
use neli::rtnl::Ifinfomsg;
use neli::socket::synchronous::NlSocketHandle;
use neli::utils::Groups;
use tokio::task::JoinHandle;

use crate::api::events::{LinkEvent, WifiHandle};
use crate::api::models::WifiError;
use crate::types::constants::rtnl_group;
use crate::Result;

/// Starts watching links and forwarding them to `events`.
///
/// Fails if the rtnetlink socket cannot be opened.
pub(crate) fn watch_links(events: WifiHandle) -> Result<JoinHandle<()>> {
    let source = netlink_links()?;
    Ok(tokio::spawn(async move {
        if let Err(e) = forward_links(source, &events).await {
            warn!("Link watch stopped: {e}");
        }
    }))
}

/// Forwards every link notification from `source` to the event loop.
///
/// Returns once the source ends, or with `WifiError::Stopped` once the
/// event loop is gone.
pub(crate) async fn forward_links<S>(source: S, events: &WifiHandle) -> Result<()>
where
    S: Stream<Item = LinkEvent>,
{
    let mut source = std::pin::pin!(source);
    while let Some(event) = source.next().await {
        debug!("Link notification {event:?}");
        events.link(event)?;
    }

    warn!("Link notification stream ended");
    Ok(())
}

/// Opens an rtnetlink socket subscribed to the link group.
fn netlink_links() -> Result<UnboundedReceiver<LinkEvent>> {
    let socket = NlSocketHandle::connect(
        NlFamily::Route,
        None,
        Groups::new_groups(&[rtnl_group::LINK]),
    )
    .map_err(|e| WifiError::Netlink(e.to_string()))?;

    let (tx, rx) = mpsc::unbounded();
    std::thread::Builder::new()
        .name("wlanmgr-links".into())
        .spawn(move || read_links(&socket, &tx))
        .map_err(|e| WifiError::Netlink(e.to_string()))?;
    debug!("Watching rtnetlink link notifications");
    Ok(rx)
}

fn read_links(socket: &NlSocketHandle, tx: &UnboundedSender<LinkEvent>) {
    loop {
        let messages = match socket.recv_all::<Rtm, Ifinfomsg>() {
            Ok((messages, _)) => messages,
            Err(e) => {
                warn!("rtnetlink receive failed: {e}");
                return;
            }
        };

        for message in messages.iter() {
            let Some(event) = link_event(message) else {
                continue;
            };
            if tx.unbounded_send(event).is_err() {
                return;
            }
        }
    }
}

fn link_event(message: &Nlmsghdr<Rtm, Ifinfomsg>) -> Option<LinkEvent> {
    let info = message.get_payload()?;
    let index = *info.ifi_index();
    match message.nl_type() {
        Rtm::Newlink => Some(LinkEvent::Added {
            index,
            link_type: u16::from(*info.ifi_type()),
        }),
        Rtm::Dellink => Some(LinkEvent::Removed { index }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::events::{WifiEvent, channel};

    #[tokio::test]
    async fn notifications_are_forwarded_in_order() {
        let (handle, mut events) = channel();
        let source = futures::stream::iter(vec![
            LinkEvent::Added {
                index: 3,
                link_type: 1,
            },
            LinkEvent::Removed { index: 3 },
        ]);

        forward_links(source, &handle).await.unwrap();

        assert!(matches!(
            events.rx.try_recv(),
            Ok(WifiEvent::Link(LinkEvent::Added {
                index: 3,
                link_type: 1
            }))
        ));
        assert!(matches!(
            events.rx.try_recv(),
            Ok(WifiEvent::Link(LinkEvent::Removed { index: 3 }))
        ));
        assert!(events.rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn forwarding_stops_when_the_loop_is_gone() {
        let (handle, events) = channel();
        drop(events);
        let source = futures::stream::iter(vec![LinkEvent::Removed { index: 3 }]);

        assert!(matches!(
            forward_links(source, &handle).await,
            Err(WifiError::Stopped)
        ));
    }

    #[tokio::test]
    async fn channel_source_is_drained_until_closed() {
        let (handle, mut events) = channel();
        let (tx, rx) = mpsc::unbounded();
        tx.unbounded_send(LinkEvent::Removed { index: 7 }).unwrap();
        drop(tx);

        forward_links(rx, &handle).await.unwrap();
        assert!(matches!(
            events.rx.try_recv(),
            Ok(WifiEvent::Link(LinkEvent::Removed { index: 7 }))
        ));
    }
}
