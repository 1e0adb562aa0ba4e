//! WAV 占位文件
//!
//! 生成格式合法但内容全为静音的 16 位 PCM WAV，并提供最小化的头部解析用于校验。

/// PCM 格式参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavFormat {
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
}

impl Default for WavFormat {
    fn default() -> Self {
        Self {
            sample_rate: 22050,
            channels: 1,
            bits_per_sample: 16,
        }
    }
}

impl WavFormat {
    pub fn mono(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            ..Self::default()
        }
    }

    pub fn block_align(&self) -> u16 {
        self.channels * (self.bits_per_sample / 8)
    }

    pub fn byte_rate(&self) -> u32 {
        self.sample_rate * self.block_align() as u32
    }
}

/// WAV 头长度（RIFF + fmt + data 头）
pub const WAV_HEADER_LEN: usize = 44;

/// 生成指定时长的静音 WAV
pub fn silent_wav(format: WavFormat, duration_secs: f64) -> Vec<u8> {
    let secs = if duration_secs.is_finite() {
        duration_secs.max(0.0)
    } else {
        0.0
    };
    let num_frames = (secs * format.sample_rate as f64).round() as usize;
    let data_size = num_frames * format.block_align() as usize;

    let mut wav = Vec::with_capacity(WAV_HEADER_LEN + data_size);
    write_header(&mut wav, format, data_size as u32);
    wav.resize(WAV_HEADER_LEN + data_size, 0);
    wav
}

fn write_header(wav: &mut Vec<u8>, format: WavFormat, data_size: u32) {
    // RIFF header
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&(36 + data_size).to_le_bytes());
    wav.extend_from_slice(b"WAVE");

    // fmt chunk
    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&16u32.to_le_bytes());
    wav.extend_from_slice(&1u16.to_le_bytes()); // PCM
    wav.extend_from_slice(&format.channels.to_le_bytes());
    wav.extend_from_slice(&format.sample_rate.to_le_bytes());
    wav.extend_from_slice(&format.byte_rate().to_le_bytes());
    wav.extend_from_slice(&format.block_align().to_le_bytes());
    wav.extend_from_slice(&format.bits_per_sample.to_le_bytes());

    // data chunk
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&data_size.to_le_bytes());
}

/// 解析出的 WAV 基本信息
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WavInfo {
    pub format: WavFormat,
    pub data_size: usize,
}

impl WavInfo {
    /// 解析 RIFF/WAVE 头，只接受 PCM
    pub fn parse(data: &[u8]) -> Result<Self, &'static str> {
        if data.len() < WAV_HEADER_LEN {
            return Err("WAV data too short");
        }
        if &data[0..4] != b"RIFF" {
            return Err("missing RIFF header");
        }
        if &data[8..12] != b"WAVE" {
            return Err("missing WAVE identifier");
        }

        let mut pos = 12;
        let mut format: Option<WavFormat> = None;

        while pos + 8 <= data.len() {
            let chunk_id = &data[pos..pos + 4];
            let chunk_size = read_u32(data, pos + 4) as usize;
            let body = pos + 8;

            match chunk_id {
                b"fmt " => {
                    if chunk_size < 16 || body + 16 > data.len() {
                        return Err("invalid fmt chunk");
                    }
                    if read_u16(data, body) != 1 {
                        return Err("not PCM");
                    }
                    format = Some(WavFormat {
                        channels: read_u16(data, body + 2),
                        sample_rate: read_u32(data, body + 4),
                        bits_per_sample: read_u16(data, body + 14),
                    });
                }
                b"data" => {
                    let format = format.ok_or("missing fmt chunk")?;
                    if body + chunk_size > data.len() {
                        return Err("truncated data chunk");
                    }
                    return Ok(Self {
                        format,
                        data_size: chunk_size,
                    });
                }
                _ => {}
            }

            // 对齐到偶数字节
            pos = body + chunk_size + (chunk_size % 2);
        }

        Err("missing data chunk")
    }

    pub fn duration_secs(&self) -> f64 {
        let byte_rate = self.format.byte_rate();
        if byte_rate == 0 {
            return 0.0;
        }
        self.data_size as f64 / byte_rate as f64
    }
}

fn read_u16(data: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([data[at], data[at + 1]])
}

fn read_u32(data: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]])
}
