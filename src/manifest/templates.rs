//! Declarative manifest templates
//!
//! Templates are written with `\n` line endings and converted to `\r\n` after
//! rendering.

/// Package identity version
pub const PACKAGE_VERSION: &str = "1.0.0.0";

/// Target device family
pub const DEVICE_FAMILY: &str = "Windows.Desktop";

/// Minimum supported platform version
pub const MIN_VERSION: &str = "10.0.17763.0";

/// Highest platform version the package was tested against
pub const MAX_VERSION_TESTED: &str = "10.0.22621.0";

/// Resource language
pub const RESOURCE_LANGUAGE: &str = "en-us";

pub(super) const STANDARD: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<Package
  xmlns="http://schemas.microsoft.com/appx/manifest/foundation/windows10"
  xmlns:uap="http://schemas.microsoft.com/appx/manifest/uap/windows10"
  xmlns:uap15="http://schemas.microsoft.com/appx/manifest/uap/windows10/15"
  IgnorableNamespaces="uap uap15">

  <Identity
    Name="{{ package_name }}ModelPackage"
    Publisher="CN={{ publisher_name }}"
    Version="{{ version }}" />

  <Properties>
    <DisplayName>{{ package_name }} Model Package</DisplayName>
    <PublisherDisplayName>{{ publisher_name }}</PublisherDisplayName>
    <Logo>{{ store_logo }}</Logo>
    <uap15:DependencyTarget>true</uap15:DependencyTarget>
  </Properties>

  <Dependencies>
    <TargetDeviceFamily Name="{{ device_family }}" MinVersion="{{ min_version }}" MaxVersionTested="{{ max_version_tested }}" />
  </Dependencies>

  <Resources>
    <Resource Language="{{ language }}" />
  </Resources>

  <Applications>
    <Application Id="App">
      <uap:VisualElements
        DisplayName="{{ package_name }} Model Package"
        Description="{{ package_name }} Model Package"
        BackgroundColor="transparent"
        Square150x150Logo="{{ medium_tile }}"
        Square44x44Logo="{{ app_list_logo }}"
        AppListEntry="none">
      </uap:VisualElements>
    </Application>
  </Applications>
</Package>"#;

pub(super) const FRAMEWORK: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<Package
  xmlns="http://schemas.microsoft.com/appx/manifest/foundation/windows10"
  xmlns:uap="http://schemas.microsoft.com/appx/manifest/uap/windows10"
  xmlns:rescap="http://schemas.microsoft.com/appx/manifest/foundation/windows10/restrictedcapabilities"
  IgnorableNamespaces="uap rescap">

  <Identity
    Name="{{ package_name }}Framework"
    Publisher="CN={{ publisher_name }}"
    Version="{{ version }}" />

  <Properties>
    <DisplayName>{{ package_name }} Framework Package</DisplayName>
    <PublisherDisplayName>{{ publisher_name }}</PublisherDisplayName>
    <Logo>{{ store_logo }}</Logo>
    <Framework>true</Framework>
  </Properties>

  <Dependencies>
    <TargetDeviceFamily Name="{{ device_family }}" MinVersion="{{ min_version }}" MaxVersionTested="{{ max_version_tested }}" />
  </Dependencies>

  <Resources>
    <Resource Language="{{ language }}" />
  </Resources>

  <Capabilities>
    <rescap:Capability Name="runFullTrust" />
  </Capabilities>
</Package>"#;
