#[cfg(test)]
mod tests {
    use crate::error::PixelNetError;
    use crate::models::PixelNetConfig;
    use backbones::BackboneKind;

    #[test]
    fn test_zero_branches_rejected() {
        let config = PixelNetConfig::new().with_branches(0);

        match config.validate() {
            Err(PixelNetError::InvalidConfiguration { reason }) => {
                assert!(reason.contains("1..=4"));
            }
            _ => panic!("Expected InvalidConfiguration error"),
        }
    }

    #[test]
    fn test_too_many_branches_rejected() {
        let config = PixelNetConfig::new().with_branches(5);

        match config.validate() {
            Err(PixelNetError::InvalidConfiguration { reason }) => {
                assert!(reason.contains("got 5"));
            }
            _ => panic!("Expected InvalidConfiguration error"),
        }
    }

    #[test]
    fn test_valid_configurations() {
        for branches in 1..=4 {
            let config = PixelNetConfig::new()
                .with_backbone(BackboneKind::Resnet50)
                .with_branches(branches);

            assert!(config.validate().is_ok());
        }
    }

    #[test]
    fn test_default_configuration() {
        let config = PixelNetConfig::new();

        assert_eq!(config.backbone, BackboneKind::Resnet50);
        assert_eq!(config.branches, 2);
        assert_eq!(config.fused_channels, 256);
        assert!(config.validate().is_ok());
    }
}
