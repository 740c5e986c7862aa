//! Finding controller interfaces through hidapi.

use anyhow::{Context, Result, bail};
use hid_steam_controller_protocol::{
    DeviceSignature, STEAM_VENDOR_ID, SignatureVerdict, verify_signature,
};
use hidapi::{DeviceInfo, HidApi};
use sc_hid_common::HidDeviceInfo;
use sc_hid_common::hidapi_transport::{HidapiFrameReader, HidapiTransport};
use serde::Serialize;
use tracing::{debug, warn};

/// One Valve HID interface and what the driver would make of it.
#[derive(Debug, Serialize)]
pub struct Interface {
    pub info: HidDeviceInfo,
    pub verdict: String,
    pub bindable: bool,
    #[serde(skip)]
    raw: DeviceInfo,
}

impl Interface {
    fn classify(raw: DeviceInfo, info: HidDeviceInfo) -> Self {
        let verdict = verify_signature(&DeviceSignature::new(
            info.vendor_id,
            info.product_id,
            &info.report_descriptor,
        ));
        Self {
            bindable: matches!(verdict, SignatureVerdict::Controller(_)),
            verdict: format!("{verdict:?}"),
            info,
            raw,
        }
    }
}

/// Every Valve interface that could be opened and described.
pub fn enumerate(api: &HidApi) -> Vec<Interface> {
    api.device_list()
        .filter(|dev| dev.vendor_id() == STEAM_VENDOR_ID)
        .filter_map(|dev| match describe(api, dev) {
            Ok(info) => Some(Interface::classify(dev.clone(), info)),
            Err(e) => {
                warn!("Skipping {:?}: {:#}", dev.path(), e);
                None
            }
        })
        .collect()
}

fn describe(api: &HidApi, dev: &DeviceInfo) -> Result<HidDeviceInfo> {
    let transport = HidapiTransport::open(api, dev).context("Failed to open interface")?;
    Ok(transport.describe(dev)?)
}

/// An opened controller interface.
pub struct OpenController {
    pub info: HidDeviceInfo,
    pub control: HidapiTransport,
    pub frames: HidapiFrameReader,
}

/// Open the first controller interface, or the one at `path`.
pub fn open_controller(api: &HidApi, path: Option<&str>) -> Result<OpenController> {
    let interfaces = enumerate(api);
    let Some(found) = interfaces.into_iter().find(|iface| match path {
        Some(path) => iface.info.path == path,
        None => iface.bindable,
    }) else {
        match path {
            Some(path) => bail!("No Valve HID interface at {path}"),
            None => bail!("No Steam Controller interface found"),
        }
    };
    debug!("Opening {} ({})", found.info.path, found.verdict);

    let control = HidapiTransport::open(api, &found.raw)
        .with_context(|| format!("Failed to open {}", found.info.path))?;
    let frames = HidapiFrameReader::open(api, &found.raw)
        .with_context(|| format!("Failed to open {} for reading", found.info.path))?;
    Ok(OpenController {
        info: found.info,
        control,
        frames,
    })
}
