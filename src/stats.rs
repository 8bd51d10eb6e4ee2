use serde::Serialize;

/// Line statistics scraped from one status page. An empty value means the modem did
/// not report that statistic.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct DslStats {
    #[serde(rename = "Down")]
    pub down: String,
    #[serde(rename = "Up")]
    pub up: String,
    /// Whole seconds since the link trained.
    #[serde(rename = "LinkUptime")]
    pub link_uptime: String,
    #[serde(rename = "Retrains")]
    pub retrains: String,
    #[serde(rename = "LossOfPowerLink")]
    pub loss_of_power_link: String,
    #[serde(rename = "LossOfSignalLink")]
    pub loss_of_signal_link: String,
    #[serde(rename = "LinkTrainErrors")]
    pub link_train_errors: String,
    #[serde(rename = "UnavailableSeconds")]
    pub unavailable_seconds: String,

    #[serde(rename = "SNRDown")]
    pub snr_down: String,
    #[serde(rename = "SNRUp")]
    pub snr_up: String,

    #[serde(rename = "AttenuationUp")]
    pub attenuation_up: String,
    #[serde(rename = "AttenuationDown")]
    pub attenuation_down: String,

    #[serde(rename = "PowerUp")]
    pub power_up: String,
    #[serde(rename = "PowerDown")]
    pub power_down: String,

    #[serde(rename = "PacketsDown")]
    pub packets_down: String,
    #[serde(rename = "PacketsUp")]
    pub packets_up: String,

    #[serde(rename = "ErrorPacketsDown")]
    pub error_packets_down: String,
    #[serde(rename = "ErrorPacketsUp")]
    pub error_packets_up: String,

    #[serde(rename = "CRCNearEnd")]
    pub crc_near_end: String,
    #[serde(rename = "CRCFarEnd")]
    pub crc_far_end: String,

    #[serde(rename = "RSNearEnd")]
    pub rs_near_end: String,
    #[serde(rename = "RSFarEnd")]
    pub rs_far_end: String,
}

/// Names one statistic of [`DslStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Down,
    Up,
    LinkUptime,
    Retrains,
    LossOfPowerLink,
    LossOfSignalLink,
    LinkTrainErrors,
    UnavailableSeconds,
    SnrDown,
    SnrUp,
    AttenuationUp,
    AttenuationDown,
    PowerUp,
    PowerDown,
    PacketsDown,
    PacketsUp,
    ErrorPacketsDown,
    ErrorPacketsUp,
    CrcNearEnd,
    CrcFarEnd,
    RsNearEnd,
    RsFarEnd,
}

impl Field {
    /// Emission order of the metrics line.
    pub const ALL: [Field; 22] = [
        Field::Down,
        Field::Up,
        Field::LinkUptime,
        Field::Retrains,
        Field::LossOfPowerLink,
        Field::LossOfSignalLink,
        Field::LinkTrainErrors,
        Field::UnavailableSeconds,
        Field::SnrDown,
        Field::SnrUp,
        Field::AttenuationUp,
        Field::AttenuationDown,
        Field::PowerUp,
        Field::PowerDown,
        Field::PacketsDown,
        Field::PacketsUp,
        Field::ErrorPacketsDown,
        Field::ErrorPacketsUp,
        Field::CrcNearEnd,
        Field::CrcFarEnd,
        Field::RsNearEnd,
        Field::RsFarEnd,
    ];

    /// Key used for the field in line protocol.
    pub fn name(self) -> &'static str {
        match self {
            Field::Down => "Down",
            Field::Up => "Up",
            Field::LinkUptime => "LinkUptime",
            Field::Retrains => "Retrains",
            Field::LossOfPowerLink => "LossOfPowerLink",
            Field::LossOfSignalLink => "LossOfSignalLink",
            Field::LinkTrainErrors => "LinkTrainErrors",
            Field::UnavailableSeconds => "UnavailableSeconds",
            Field::SnrDown => "SNRDown",
            Field::SnrUp => "SNRUp",
            Field::AttenuationUp => "AttenuationUp",
            Field::AttenuationDown => "AttenuationDown",
            Field::PowerUp => "PowerUp",
            Field::PowerDown => "PowerDown",
            Field::PacketsDown => "PacketsDown",
            Field::PacketsUp => "PacketsUp",
            Field::ErrorPacketsDown => "ErrorPacketsDown",
            Field::ErrorPacketsUp => "ErrorPacketsUp",
            Field::CrcNearEnd => "CRCNearEnd",
            Field::CrcFarEnd => "CRCFarEnd",
            Field::RsNearEnd => "RSNearEnd",
            Field::RsFarEnd => "RSFarEnd",
        }
    }
}

impl DslStats {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Down => &self.down,
            Field::Up => &self.up,
            Field::LinkUptime => &self.link_uptime,
            Field::Retrains => &self.retrains,
            Field::LossOfPowerLink => &self.loss_of_power_link,
            Field::LossOfSignalLink => &self.loss_of_signal_link,
            Field::LinkTrainErrors => &self.link_train_errors,
            Field::UnavailableSeconds => &self.unavailable_seconds,
            Field::SnrDown => &self.snr_down,
            Field::SnrUp => &self.snr_up,
            Field::AttenuationUp => &self.attenuation_up,
            Field::AttenuationDown => &self.attenuation_down,
            Field::PowerUp => &self.power_up,
            Field::PowerDown => &self.power_down,
            Field::PacketsDown => &self.packets_down,
            Field::PacketsUp => &self.packets_up,
            Field::ErrorPacketsDown => &self.error_packets_down,
            Field::ErrorPacketsUp => &self.error_packets_up,
            Field::CrcNearEnd => &self.crc_near_end,
            Field::CrcFarEnd => &self.crc_far_end,
            Field::RsNearEnd => &self.rs_near_end,
            Field::RsFarEnd => &self.rs_far_end,
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let slot = match field {
            Field::Down => &mut self.down,
            Field::Up => &mut self.up,
            Field::LinkUptime => &mut self.link_uptime,
            Field::Retrains => &mut self.retrains,
            Field::LossOfPowerLink => &mut self.loss_of_power_link,
            Field::LossOfSignalLink => &mut self.loss_of_signal_link,
            Field::LinkTrainErrors => &mut self.link_train_errors,
            Field::UnavailableSeconds => &mut self.unavailable_seconds,
            Field::SnrDown => &mut self.snr_down,
            Field::SnrUp => &mut self.snr_up,
            Field::AttenuationUp => &mut self.attenuation_up,
            Field::AttenuationDown => &mut self.attenuation_down,
            Field::PowerUp => &mut self.power_up,
            Field::PowerDown => &mut self.power_down,
            Field::PacketsDown => &mut self.packets_down,
            Field::PacketsUp => &mut self.packets_up,
            Field::ErrorPacketsDown => &mut self.error_packets_down,
            Field::ErrorPacketsUp => &mut self.error_packets_up,
            Field::CrcNearEnd => &mut self.crc_near_end,
            Field::CrcFarEnd => &mut self.crc_far_end,
            Field::RsNearEnd => &mut self.rs_near_end,
            Field::RsFarEnd => &mut self.rs_far_end,
        };
        *slot = value.into();
    }

    /// Every field as `(name, value)`, in emission order.
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        Field::ALL
            .into_iter()
            .map(move |field| (field.name(), self.get(field)))
    }

    /// Only the fields the modem actually reported.
    pub fn reported(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        self.fields().filter(|(_, value)| !value.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.reported().next().is_none()
    }
}
