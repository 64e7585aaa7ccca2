use tracing_subscriber::EnvFilter;

/// Instala el subscriber de `tracing` para la aplicación anfitriona.
///
/// Combina `RUST_LOG` con la directiva configurada (por ejemplo
/// `guild_player=debug`). Si ya hay un subscriber global no hace nada.
pub fn init(directive: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::from_default_env().add_directive(directive.parse()?);

    // try_init falla si otro componente ya registró un subscriber global
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_repeatable() {
        assert!(init("guild_player=debug").is_ok());
        assert!(init("guild_player=info").is_ok());
    }

    #[test]
    fn test_init_rejects_bad_directive() {
        assert!(init("guild_player=notalevel").is_err());
    }
}
