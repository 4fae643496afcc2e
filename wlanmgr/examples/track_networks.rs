use std::time::Duration;
use wlanmgr::{WifiConfig, WifiPlugin};

#[tokio::main]
async fn main() -> wlanmgr::Result<()> {
    let mut plugin = WifiPlugin::system(WifiConfig::default()).await?;
    let handle = plugin.handle();
    tokio::spawn(async move { plugin.run().await });

    let devices = handle.devices().await?;
    for device in &devices {
        println!("Enabling {} ({})", device.interface, device.name);
        handle.enable_device(device.index).await?;
    }

    for _ in 0..3 {
        tokio::time::sleep(Duration::from_secs(10)).await;
        for device in &devices {
            handle.update_device(device.index).await?;
            println!("{}:", device.interface);
            for net in handle.networks(device.index).await? {
                println!(
                    "  {:32} {:>3}%  {:5} {:?}",
                    net.identifier, net.quality, net.security, net.generation
                );
            }
        }
    }

    handle.shutdown().await
}
