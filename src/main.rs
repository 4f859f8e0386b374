use clap::Parser;
use std::collections::BTreeMap;
use railway_provisioner::core::database_catalog::list_database_types;
use railway_provisioner::core::region::Region;
use railway_provisioner::core::template_resolver::TemplateResolver;
use railway_provisioner::utils::error::ErrorSeverity;
use railway_provisioner::utils::{logger, validation::Validate};
use railway_provisioner::{
    CliArgs, GraphQlClient, ProvisionError, ProvisionerConfig, ProvisioningOrchestrator,
    RailwayApi,
};

fn exit_with(e: ProvisionError) -> ! {
    // 記錄詳細錯誤信息
    tracing::error!(
        "❌ Provisioning failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    // 輸出用戶友好的錯誤信息
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 建議: {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}

fn print_regions() {
    println!("Supported regions:");
    for region in Region::ALL {
        println!("  {:<16} {}", region.as_str(), region.location());
    }
}

fn print_database_types() {
    for (category, entries) in list_database_types() {
        println!("{}:", category);
        for (db, config) in entries {
            println!("  {:<12} {}", db.as_str(), config.description);
        }
    }
}

async fn print_templates(api: &RailwayApi, query: Option<&str>) -> Result<(), ProvisionError> {
    let templates = TemplateResolver::new(api.repositories().templates)
        .list_provisionable(query)
        .await?;

    // 依分類分組，組內維持專案數排序
    let mut by_category: BTreeMap<String, Vec<_>> = BTreeMap::new();
    for template in &templates {
        by_category
            .entry(template.category.clone().unwrap_or_else(|| "-".to_string()))
            .or_default()
            .push(template);
    }

    println!("Provisionable templates ({}):", templates.len());
    for (category, entries) in by_category {
        println!("📁 {}", category);
        for template in entries {
            println!(
                "  {:<24} {} ({} projects)",
                template.id, template.name, template.projects
            );
        }
    }
    Ok(())
}

fn connect(config: &ProvisionerConfig) -> Result<RailwayApi, ProvisionError> {
    let client = GraphQlClient::from_config(config)?;
    if !client.has_token() {
        return Err(ProvisionError::MissingCredential);
    }
    Ok(RailwayApi::new(client))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    let config = match args.load_config() {
        Ok(config) => config,
        Err(e) => {
            logger::init_cli_logger(args.verbose);
            exit_with(e);
        }
    };

    // 初始化日誌
    logger::init_logger(config.log_format, args.verbose);

    tracing::info!("Starting railway-provisioner CLI");
    tracing::debug!(
        "Endpoint: {}, batch size: {}, timeout: {}s, token set: {}",
        config.api_endpoint,
        config.variable_batch_size,
        config.request_timeout_seconds,
        config.api_token.is_some()
    );

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        exit_with(e);
    }

    if args.list_regions {
        print_regions();
    }
    if args.list_database_types {
        print_database_types();
    }
    if args.list_templates {
        let api = connect(&config).unwrap_or_else(|e| exit_with(e));
        if let Err(e) = print_templates(&api, args.search.as_deref()).await {
            exit_with(e);
        }
    }
    if args.is_listing() {
        return Ok(());
    }

    let request = match args.to_request().and_then(|r| r.validate().map(|_| r)) {
        Ok(request) => request,
        Err(e) => exit_with(e),
    };

    let api = connect(&config).unwrap_or_else(|e| exit_with(e));
    let orchestrator = ProvisioningOrchestrator::from_config(api.repositories(), &config);

    match orchestrator.provision(&request).await {
        Ok(resources) => {
            tracing::info!("✅ Provisioning completed successfully!");
            println!("✅ {}", resources.summary);
            println!(
                "{}",
                serde_json::to_string_pretty(&resources.execution_summary())?
            );
        }
        Err(e) => exit_with(e),
    }

    Ok(())
}
