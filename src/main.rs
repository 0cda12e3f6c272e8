use crate::{
    config::Configuration, i18n::Messages, pages::render_page, renderer::Parser, title::Title,
};
use std::io::Read as _;

mod common;
mod config;
mod css;
mod i18n;
mod link;
mod output;
mod pages;
mod renderer;
mod skin;
mod title;

fn usage<T>(err: &'static str) -> anyhow::Result<T> {
    let exe = std::env::args().next().unwrap_or_default();
    println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    println!("Usage: {exe} [options] <page title> [wikitext file]\n");
    println!("Reads the page source from stdin if no file is given.\n");
    println!("or, use environment variables:");
    println!("    WIKI_LANGLINKS_CONFIG\n");
    println!("Options:");
    println!("    --config: Site configuration JSON file (default: built-in)");
    println!("    --lang: Interface language (default: from configuration)");
    println!("    --props: Print the page properties instead of the page\n");
    Err(anyhow::Error::msg(err))
}

fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let mut args = pico_args::Arguments::from_env();
    if args.contains(["-h", "--help"]) {
        return usage("Help requested");
    }

    let config_path = args
        .opt_value_from_str::<_, String>("--config")?
        .or_else(|| std::env::var("WIKI_LANGLINKS_CONFIG").ok());
    let lang = args.opt_value_from_str::<_, String>("--lang")?;
    let props = args.contains("--props");
    let _ = args.contains("--");
    let Some(page_name) = args.opt_free_from_str::<String>()? else {
        return usage("Missing page title argument");
    };
    let source_path = args.opt_free_from_str::<String>()?;

    if !args.finish().is_empty() {
        return usage("Unknown extra arguments passed");
    }

    let mut config = if let Some(path) = config_path {
        Configuration::from_file(path)?
    } else {
        Configuration::default()
    };
    if let Some(lang) = lang {
        config.language = lang;
    }

    let source = if let Some(path) = source_path {
        std::fs::read_to_string(&path).map_err(|err| anyhow::anyhow!("{path}: {err}"))?
    } else {
        let mut source = String::new();
        std::io::stdin().read_to_string(&mut source)?;
        source
    };

    let messages = Messages::for_config(&config)?;
    let parser = Parser::new(&config, &messages);
    let title = Title::new_from_text(&page_name, &config)
        .map_err(|err| anyhow::anyhow!("{page_name}: {err}"))?;
    log::info!("Rendering '{title}' in '{}'", messages.language());

    let page = render_page(&parser, &title, &source)?;
    if props {
        println!("{}", serde_json::to_string_pretty(&page.page_properties)?);
    } else {
        println!("{}", page.content.trim_end());
        print!("{}", page.sidebar);
    }

    Ok(())
}
