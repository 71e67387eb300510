//! Network application command handlers.

use unified_api::Client;
use unified_api::types::{
    ClientActionRequest, ClientId, DeviceActionRequest, DeviceId, DevicePortActionRequest, SiteId,
    VoucherGenerateRequest, VoucherId,
};
use unified_api::Filter;

use crate::cli::{
    ClientsCommand, DevicesCommand, NetworkArgs, NetworkCommand, OutputFormat, SitesCommand,
    VouchersCommand,
};
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn handle(args: NetworkArgs, client: &Client, format: OutputFormat) -> Result<(), CliError> {
    let api = client.network();
    match args.command {
        NetworkCommand::Info => output::print(format, &api.info().await?),

        NetworkCommand::Sites {
            command: SitesCommand::List(list),
        } => {
            let page = api
                .sites(util::filter(&list).as_ref(), util::page_arguments(&list.page).as_ref())
                .await?;
            output::print_output(&output::render_page(format, &page, &list.page, |s| s.id.as_str())?);
            Ok(())
        }

        NetworkCommand::Clients { command } => clients(client, command, format).await,
        NetworkCommand::Devices { command } => devices(client, command, format).await,
        NetworkCommand::Vouchers { command } => vouchers(client, command, format).await,
    }
}

async fn clients(client: &Client, command: ClientsCommand, format: OutputFormat) -> Result<(), CliError> {
    let api = client.network();
    match command {
        ClientsCommand::List { site, list } => {
            let page = api
                .clients(
                    &SiteId(site.site),
                    util::filter(&list).as_ref(),
                    util::page_arguments(&list.page).as_ref(),
                )
                .await?;
            output::print_output(&output::render_page(format, &page, &list.page, |c| c.id.as_str())?);
            Ok(())
        }

        ClientsCommand::Details { site, client: id } => {
            let details = api.client_details(&SiteId(site.site), &ClientId(id)).await?;
            output::print(format, &details)
        }

        ClientsCommand::Action {
            site,
            client: id,
            action,
            time_limit,
            data_limit,
            rx_limit,
            tx_limit,
        } => {
            let request = ClientActionRequest {
                time_limit_minutes: time_limit,
                data_usage_limit_m_bytes: data_limit,
                rx_rate_limit_kbps: rx_limit,
                tx_rate_limit_kbps: tx_limit,
                ..ClientActionRequest::new(action)
            };
            let result = api
                .client_execute_action(&SiteId(site.site), &ClientId(id), &request)
                .await?;
            if result.is_null() {
                return Ok(());
            }
            output::print(format, &result)
        }
    }
}

async fn devices(client: &Client, command: DevicesCommand, format: OutputFormat) -> Result<(), CliError> {
    let api = client.network();
    match command {
        DevicesCommand::List { site, page } => {
            let devices = api
                .devices(&SiteId(site.site), util::page_arguments(&page).as_ref())
                .await?;
            output::print_output(&output::render_page(format, &devices, &page, |d| d.id.as_str())?);
            Ok(())
        }

        DevicesCommand::Details { site, device } => {
            let details = api.device_details(&SiteId(site.site), &DeviceId(device)).await?;
            output::print(format, &details)
        }

        DevicesCommand::Stats { site, device } => {
            let stats = api
                .device_statistics(&SiteId(site.site), &DeviceId(device))
                .await?;
            output::print(format, &stats)
        }

        DevicesCommand::Action {
            site,
            device,
            action,
        } => {
            api.device_execute_action(
                &SiteId(site.site),
                &DeviceId(device),
                &DeviceActionRequest { action },
            )
            .await?;
            Ok(())
        }

        DevicesCommand::PortAction {
            site,
            device,
            port,
            action,
        } => {
            api.device_port_execute_action(
                &SiteId(site.site),
                &DeviceId(device),
                port,
                &DevicePortActionRequest { action },
            )
            .await?;
            Ok(())
        }
    }
}

async fn vouchers(client: &Client, command: VouchersCommand, format: OutputFormat) -> Result<(), CliError> {
    let api = client.network();
    match command {
        VouchersCommand::List { site, list } => {
            let page = api
                .vouchers(
                    &SiteId(site.site),
                    util::filter(&list).as_ref(),
                    util::page_arguments(&list.page).as_ref(),
                )
                .await?;
            output::print_output(&output::render_page(format, &page, &list.page, |v| v.id.as_str())?);
            Ok(())
        }

        VouchersCommand::Details { site, voucher } => {
            let details = api
                .voucher_details(&SiteId(site.site), &VoucherId(voucher))
                .await?;
            output::print(format, &details)
        }

        VouchersCommand::Generate {
            site,
            count,
            name,
            guest_limit,
            time_limit,
            data_limit,
            rx_limit,
            tx_limit,
        } => {
            let request = VoucherGenerateRequest {
                count,
                name,
                authorized_guest_limit: guest_limit,
                time_limit_minutes: time_limit,
                data_usage_limit_m_bytes: data_limit,
                rx_rate_limit_kbps: rx_limit,
                tx_rate_limit_kbps: tx_limit,
            };
            let vouchers = api.voucher_generate(&SiteId(site.site), &request).await?;
            output::print(format, &vouchers)
        }

        VouchersCommand::Delete { site, voucher } => {
            let deleted = api
                .voucher_delete(&SiteId(site.site), &VoucherId(voucher))
                .await?;
            output::print(format, &deleted)
        }

        VouchersCommand::DeleteFilter { site, filter, yes } => {
            let prompt = format!("Delete every voucher matching {filter}?");
            if !util::confirm(&prompt, yes)? {
                return Err(CliError::NotConfirmed {
                    action: "vouchers delete-filter".into(),
                });
            }
            let deleted = api
                .voucher_delete_by_filter(&SiteId(site.site), &Filter::new(filter))
                .await?;
            output::print(format, &deleted)
        }
    }
}
