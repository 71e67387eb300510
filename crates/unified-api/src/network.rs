// Typed operations for the Network application.

use tracing::trace;

use crate::client::Client;
use crate::endpoint::Endpoint;
use crate::error::Error;
use crate::request::{Body, Filter, PageArguments, Query, RequestDescriptor, list_query};
use crate::types::{
    ClientActionRequest, ClientId, Device, DeviceActionRequest, DeviceId, DeviceListEntry,
    DevicePortActionRequest, DeviceStatistics, NetworkClient, NetworkInfo, Page, Site, SiteId,
    Voucher, VoucherDeleteResponse, VoucherGenerateRequest, VoucherGenerateResponse, VoucherId,
};

/// Borrowed view over a [`Client`] exposing Network endpoints.
#[derive(Debug, Clone, Copy)]
pub struct NetworkApi<'a> {
    client: &'a Client,
}

impl<'a> NetworkApi<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    // ── Application ──────────────────────────────────────────────────

    pub async fn info(&self) -> Result<NetworkInfo, Error> {
        self.client
            .execute_json(RequestDescriptor::new(Endpoint::NetworkInfo))
            .await
    }

    // ── Sites ────────────────────────────────────────────────────────

    pub async fn sites(
        &self,
        filter: Option<&Filter>,
        page: Option<&PageArguments>,
    ) -> Result<Page<Site>, Error> {
        self.client
            .execute_json(RequestDescriptor::new(Endpoint::Sites).query(list_query(filter, page)))
            .await
    }

    // ── Clients ──────────────────────────────────────────────────────

    pub async fn clients(
        &self,
        site: &SiteId,
        filter: Option<&Filter>,
        page: Option<&PageArguments>,
    ) -> Result<Page<NetworkClient>, Error> {
        self.client
            .execute_json(
                RequestDescriptor::new(Endpoint::Clients)
                    .arg(site)
                    .query(list_query(filter, page)),
            )
            .await
    }

    pub async fn client_details(
        &self,
        site: &SiteId,
        client: &ClientId,
    ) -> Result<NetworkClient, Error> {
        self.client
            .execute_json(
                RequestDescriptor::new(Endpoint::ClientDetails)
                    .arg(site)
                    .arg(client),
            )
            .await
    }

    /// Run a client action. The console echoes the action result as JSON.
    pub async fn client_execute_action(
        &self,
        site: &SiteId,
        client: &ClientId,
        request: &ClientActionRequest,
    ) -> Result<serde_json::Value, Error> {
        trace!(action = %request.action, client = %client, "client action");
        let body = self
            .client
            .execute(
                RequestDescriptor::new(Endpoint::ClientExecuteAction)
                    .arg(site)
                    .arg(client)
                    .body(Body::json(request)?),
            )
            .await?;
        if body.is_empty() {
            return Ok(serde_json::Value::Null);
        }
        crate::client::decode(&body)
    }

    // ── Devices ──────────────────────────────────────────────────────

    pub async fn devices(
        &self,
        site: &SiteId,
        page: Option<&PageArguments>,
    ) -> Result<Page<DeviceListEntry>, Error> {
        self.client
            .execute_json(
                RequestDescriptor::new(Endpoint::Devices)
                    .arg(site)
                    .query(list_query(None, page)),
            )
            .await
    }

    pub async fn device_details(&self, site: &SiteId, device: &DeviceId) -> Result<Device, Error> {
        self.client
            .execute_json(
                RequestDescriptor::new(Endpoint::DeviceDetails)
                    .arg(site)
                    .arg(device),
            )
            .await
    }

    pub async fn device_statistics(
        &self,
        site: &SiteId,
        device: &DeviceId,
    ) -> Result<DeviceStatistics, Error> {
        self.client
            .execute_json(
                RequestDescriptor::new(Endpoint::DeviceStatistics)
                    .arg(site)
                    .arg(device),
            )
            .await
    }

    pub async fn device_execute_action(
        &self,
        site: &SiteId,
        device: &DeviceId,
        request: &DeviceActionRequest,
    ) -> Result<(), Error> {
        trace!(action = %request.action, device = %device, "device action");
        self.client
            .execute_empty(
                RequestDescriptor::new(Endpoint::DeviceExecuteAction)
                    .arg(site)
                    .arg(device)
                    .body(Body::json(request)?),
            )
            .await
    }

    pub async fn device_port_execute_action(
        &self,
        site: &SiteId,
        device: &DeviceId,
        port_idx: u32,
        request: &DevicePortActionRequest,
    ) -> Result<(), Error> {
        trace!(action = %request.action, device = %device, port_idx, "port action");
        self.client
            .execute_empty(
                RequestDescriptor::new(Endpoint::DevicePortExecuteAction)
                    .arg(site)
                    .arg(device)
                    .arg(port_idx)
                    .body(Body::json(request)?),
            )
            .await
    }

    // ── Hotspot vouchers ─────────────────────────────────────────────

    pub async fn vouchers(
        &self,
        site: &SiteId,
        filter: Option<&Filter>,
        page: Option<&PageArguments>,
    ) -> Result<Page<Voucher>, Error> {
        self.client
            .execute_json(
                RequestDescriptor::new(Endpoint::Vouchers)
                    .arg(site)
                    .query(list_query(filter, page)),
            )
            .await
    }

    pub async fn voucher_details(&self, site: &SiteId, voucher: &VoucherId) -> Result<Voucher, Error> {
        self.client
            .execute_json(
                RequestDescriptor::new(Endpoint::VoucherDetails)
                    .arg(site)
                    .arg(voucher),
            )
            .await
    }

    /// Generate vouchers; the console answers `201 Created`.
    pub async fn voucher_generate(
        &self,
        site: &SiteId,
        request: &VoucherGenerateRequest,
    ) -> Result<Vec<Voucher>, Error> {
        trace!(count = request.count, name = %request.name, "generating vouchers");
        let response: VoucherGenerateResponse = self
            .client
            .execute_json(
                RequestDescriptor::new(Endpoint::VoucherGenerate)
                    .arg(site)
                    .body(Body::json(request)?),
            )
            .await?;
        Ok(response.vouchers)
    }

    pub async fn voucher_delete(
        &self,
        site: &SiteId,
        voucher: &VoucherId,
    ) -> Result<VoucherDeleteResponse, Error> {
        self.client
            .execute_json(
                RequestDescriptor::new(Endpoint::VoucherDelete)
                    .arg(site)
                    .arg(voucher),
            )
            .await
    }

    /// Delete every voucher matching `filter`. An empty filter matches all.
    pub async fn voucher_delete_by_filter(
        &self,
        site: &SiteId,
        filter: &Filter,
    ) -> Result<VoucherDeleteResponse, Error> {
        self.client
            .execute_json(
                RequestDescriptor::new(Endpoint::VoucherDeleteByFilter)
                    .arg(site)
                    .query(Query::new().with("filter", filter.0.as_str())),
            )
            .await
    }
}
