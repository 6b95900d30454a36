use std::{process, sync::Arc};

use storefront::{
    application::{
        error::AppError,
        layout::PageContext,
        repos::Repositories,
        request::{RequestContext, RequestServices},
    },
    config::{self, ResolveArgs, ResolveTarget, Settings},
    infra::{catalog::InMemoryCatalog, error::InfraError, telemetry},
};
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(error.exit_code());
    }
}

fn report_application_error(error: &AppError) {
    let chain = error.report().chain();
    if dispatcher::has_been_set() {
        error!(error = %chain, "application error");
        return;
    }

    let subscriber = tracing_fmt()
        .with_max_level(Level::ERROR)
        .with_writer(std::io::stderr)
        .finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %chain, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()?;

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match cli_args.command {
        config::Command::Resolve(args) => run_resolve(settings, *args).await,
    }
}

async fn run_resolve(settings: Settings, args: ResolveArgs) -> Result<(), AppError> {
    let catalog = Arc::new(
        InMemoryCatalog::load(&args.catalog)
            .await
            .map_err(InfraError::from)?,
    );
    let repos = Repositories::from_backend(catalog.clone());
    let storefront = Arc::new(settings.storefront);

    let context = RequestContext::new(args.lang.as_deref(), settings.tracking);
    let services = RequestServices::new(&repos, storefront, &context);

    let target = args.target();
    info!(?target, lang = %context.lang(), "resolving page");

    let page = resolve_page(&services, &catalog, target).await?;
    let rendered = serde_json::to_string_pretty(&page)
        .map_err(|err| AppError::unexpected(format!("failed to serialize page: {err}")))?;
    println!("{rendered}");

    context.finish();
    Ok(())
}

async fn resolve_page(
    services: &RequestServices,
    catalog: &InMemoryCatalog,
    target: ResolveTarget,
) -> Result<PageContext, AppError> {
    match target {
        ResolveTarget::Home => Ok(services.layout.render_home().await?),
        ResolveTarget::Category(id) => services
            .layout
            .render_category(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("category {id}"))),
        ResolveTarget::Item {
            item_id,
            variation_id,
            category_id,
        } => {
            let item = catalog
                .current_item(item_id, variation_id)
                .ok_or_else(|| {
                    AppError::not_found(format!("variation {variation_id} of item {item_id}"))
                })?;
            Ok(services.layout.render_item(item, category_id).await?)
        }
    }
}
