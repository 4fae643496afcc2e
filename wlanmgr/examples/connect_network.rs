use std::time::Duration;
use wlanmgr::{WifiConfig, WifiPlugin};

#[tokio::main]
async fn main() -> wlanmgr::Result<()> {
    let mut args = std::env::args().skip(1);
    let (Some(ssid), passphrase) = (args.next(), args.next()) else {
        eprintln!("usage: connect_network <ssid> [passphrase]");
        return Ok(());
    };

    let mut plugin = WifiPlugin::system(WifiConfig::default()).await?;
    let handle = plugin.handle();
    tokio::spawn(async move { plugin.run().await });

    let Some(device) = handle.devices().await?.into_iter().next() else {
        eprintln!("No wireless device found");
        return handle.shutdown().await;
    };
    handle.enable_device(device.index).await?;

    // Give the first scan time to report.
    tokio::time::sleep(Duration::from_secs(5)).await;

    let networks = handle.networks(device.index).await?;
    let Some(network) = networks.iter().find(|n| n.identifier == ssid) else {
        eprintln!("{ssid} is not in range");
        return handle.shutdown().await;
    };

    if let Some(passphrase) = passphrase {
        handle.set_passphrase(network.id, &passphrase).await?;
    }
    handle.enable_network(network.id).await?;

    for _ in 0..30 {
        tokio::time::sleep(Duration::from_secs(1)).await;
        if let Some(info) = handle
            .devices()
            .await?
            .into_iter()
            .find(|d| d.index == device.index)
            && info.is_connected()
        {
            println!("Connected to {ssid}");
            break;
        }
    }

    handle.shutdown().await
}
