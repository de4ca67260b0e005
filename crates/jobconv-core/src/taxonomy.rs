//! Two-level job taxonomy (major / minor / link key)
//!
//! The taxonomy is an ordered table. Lookups are linear and first match
//! wins, so a minor label that appears twice resolves to the earlier row.

use crate::error::{Error, Result};
use crate::io::skip_bom;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// One row of the taxonomy table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyEntry {
    pub major: String,
    pub minor: String,
    /// External link key, empty when the row has none
    #[serde(default)]
    pub link_key: String,
}

impl TaxonomyEntry {
    pub fn new(major: impl Into<String>, minor: impl Into<String>) -> Self {
        Self {
            major: major.into(),
            minor: minor.into(),
            link_key: String::new(),
        }
    }

    pub fn with_link_key(mut self, link_key: impl Into<String>) -> Self {
        self.link_key = link_key.into();
        self
    }
}

/// Something that can produce taxonomy rows
pub trait TaxonomySource {
    /// Load all rows in table order
    fn load(&self) -> Result<Vec<TaxonomyEntry>>;

    /// Human-readable description for log lines
    fn describe(&self) -> String;
}

/// Taxonomy stored as a three column CSV file with a header row
#[derive(Debug, Clone)]
pub struct CsvTaxonomySource {
    path: PathBuf,
}

impl CsvTaxonomySource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TaxonomySource for CsvTaxonomySource {
    fn load(&self) -> Result<Vec<TaxonomyEntry>> {
        let file = File::open(&self.path).map_err(|e| Error::Taxonomy {
            message: format!("cannot open {}", self.path.display()),
            source: Some(e.into()),
        })?;
        read_entries(file)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Parse taxonomy rows from CSV data: major, minor and an optional link key
pub fn read_entries<R: Read>(reader: R) -> Result<Vec<TaxonomyEntry>> {
    let mut buffered = BufReader::new(reader);
    skip_bom(&mut buffered)?;

    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(buffered);

    let mut entries = Vec::new();
    for (index, record) in csv_reader.records().enumerate() {
        let record = record.map_err(|e| Error::Taxonomy {
            message: format!("malformed taxonomy row {}", index + 2),
            source: Some(e.into()),
        })?;

        let major = record.get(0).unwrap_or_default();
        let minor = record.get(1).unwrap_or_default();
        if major.is_empty() || minor.is_empty() {
            debug!(row = index + 2, "skipping incomplete taxonomy row");
            continue;
        }

        entries.push(
            TaxonomyEntry::new(major, minor).with_link_key(record.get(2).unwrap_or_default()),
        );
    }

    Ok(entries)
}

/// Ordered taxonomy table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Taxonomy {
    entries: Vec<TaxonomyEntry>,
}

impl Taxonomy {
    pub fn new(entries: Vec<TaxonomyEntry>) -> Self {
        Self { entries }
    }

    /// The built-in table shipped with the tool
    pub fn embedded() -> Self {
        Self::new(
            EMBEDDED_TAXONOMY
                .iter()
                .map(|(major, minor)| TaxonomyEntry::new(*major, *minor))
                .collect(),
        )
    }

    /// Load from `source`, falling back to the embedded table on any failure
    pub fn load_or_embedded(source: &dyn TaxonomySource) -> Self {
        match source.load() {
            Ok(entries) if !entries.is_empty() => {
                debug!(source = %source.describe(), rows = entries.len(), "taxonomy loaded");
                Self::new(entries)
            }
            Ok(_) => {
                warn!(source = %source.describe(), "taxonomy source is empty, using embedded table");
                Self::embedded()
            }
            Err(e) => {
                warn!(source = %source.describe(), error = %e, "taxonomy load failed, using embedded table");
                Self::embedded()
            }
        }
    }

    /// Load from an optional CSV path; `None` means the embedded table
    pub fn from_optional_path(path: Option<&Path>) -> Self {
        match path {
            Some(path) => Self::load_or_embedded(&CsvTaxonomySource::new(path)),
            None => Self::embedded(),
        }
    }

    pub fn entries(&self) -> &[TaxonomyEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Major category of the first row whose minor label equals `minor`
    pub fn major_for(&self, minor: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.minor == minor)
            .map(|entry| entry.major.as_str())
    }

    pub fn contains_minor(&self, minor: &str) -> bool {
        self.entries.iter().any(|entry| entry.minor == minor)
    }

    /// All minor labels in table order
    pub fn minor_labels(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.minor.as_str()).collect()
    }

    /// Minor labels offered to the oracle.
    ///
    /// A non-empty `link_key` restricts the list to rows carrying that key.
    /// An empty result falls back to every minor label, so the option list
    /// handed to the oracle is never empty for a non-empty table.
    pub fn options_for(&self, link_key: Option<&str>) -> Vec<String> {
        if let Some(key) = link_key.filter(|key| !key.is_empty()) {
            let filtered: Vec<String> = self
                .entries
                .iter()
                .filter(|entry| entry.link_key == key)
                .map(|entry| entry.minor.clone())
                .collect();
            if !filtered.is_empty() {
                return filtered;
            }
            debug!(link_key = key, "no taxonomy rows for link key, offering full list");
        }

        self.entries.iter().map(|entry| entry.minor.clone()).collect()
    }

    pub fn entries_for_major<'a>(
        &'a self,
        major: &'a str,
    ) -> impl Iterator<Item = &'a TaxonomyEntry> + 'a {
        self.entries.iter().filter(move |entry| entry.major == major)
    }

    /// Distinct major categories in first-seen order
    pub fn majors(&self) -> Vec<&str> {
        let mut majors: Vec<&str> = Vec::new();
        for entry in &self.entries {
            if !majors.contains(&entry.major.as_str()) {
                majors.push(&entry.major);
            }
        }
        majors
    }
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self::embedded()
    }
}

/// Built-in (major, minor) table
const EMBEDDED_TAXONOMY: &[(&str, &str)] = &[
    ("営業", "企画営業【法人営業・個人営業】"),
    ("営業", "代理店営業【代理店渉外・パートナーセールス・アライアンス】"),
    ("営業", "内勤営業、カウンターセールス"),
    ("営業", "ルートセールス、外商"),
    ("営業", "海外営業"),
    ("営業", "メディカル営業【MR・MS・DMR・医療機器営業】"),
    ("営業", "技術・システム・IT営業"),
    ("営業", "その他営業関連職"),
    ("営業", "コールセンター運営・管理・SV"),
    ("営業", "カスタマーサポート、ヘルプデスク"),
    ("営業", "オペレーター、アポインター"),
    ("営業", "キャリアカウンセラー、キャリアコンサルタント、人材派遣コーディネーター"),
    ("営業", "人材系営業"),
    ("事務・管理", "一般事務、庶務"),
    ("事務・管理", "営業事務、営業アシスタント"),
    ("事務・管理", "受付"),
    ("事務・管理", "秘書"),
    ("事務・管理", "その他事務関連職"),
    ("事務・管理", "財務、会計、税務"),
    ("事務・管理", "経理"),
    ("事務・管理", "内部統制、内部監査"),
    ("事務・管理", "総務"),
    ("事務・管理", "人事、給与、労務、採用"),
    ("事務・管理", "法務、コンプライアンス"),
    ("事務・管理", "知財、特許"),
    ("事務・管理", "広報、IR"),
    ("事務・管理", "情報セキュリティ"),
    ("事務・管理", "物流企画、物流管理、在庫管理、商品管理"),
    ("事務・管理", "資材調達、購買"),
    ("事務・管理", "貿易事務、国際業務"),
    ("事務・管理", "通関士"),
    ("企画・マーケティング・経営・管理職", "商品企画、商品開発"),
    ("企画・マーケティング・経営・管理職", "販促企画、営業企画"),
    ("企画・マーケティング・経営・管理職", "市場調査、市場分析、マーケティングリサーチ"),
    ("企画・マーケティング・経営・管理職", "広告、宣伝"),
    ("企画・マーケティング・経営・管理職", "Webマーケティング、デジタルマーケティング"),
    ("企画・マーケティング・経営・管理職", "経営企画"),
    ("企画・マーケティング・経営・管理職", "事業企画、事業統括"),
    ("企画・マーケティング・経営・管理職", "新規事業企画、事業プロデュース"),
    ("企画・マーケティング・経営・管理職", "海外事業企画"),
    ("企画・マーケティング・経営・管理職", "CEO、COO、CFO、CIO、CTO、経営幹部、幹部候補"),
    ("企画・マーケティング・経営・管理職", "管理職【営業マネージャー・企画系】"),
    ("企画・マーケティング・経営・管理職", "管理職【管理部門系】"),
    ("企画・マーケティング・経営・管理職", "管理職【その他】"),
    ("企画・マーケティング・経営・管理職", "マーチャンダイザー、VMD、バイヤー、買取査定"),
    ("企画・マーケティング・経営・管理職", "店舗開発、FC開発"),
    ("企画・マーケティング・経営・管理職", "FCオーナー、代理店研修生"),
    ("サービス・販売・外食", "スーパーバイザー、店舗指導、エリアマネージャー"),
    ("サービス・販売・外食", "教育・研修トレーナー【サービス・販売・外食系】"),
    ("サービス・販売・外食", "店長、店長候補、店長補佐"),
    ("サービス・販売・外食", "販売スタッフ、販売アドバイザー、売場担当"),
    ("サービス・販売・外食", "美容部員、化粧品販売員"),
    ("サービス・販売・外食", "ホールスタッフ、フロアスタッフ"),
    ("サービス・販売・外食", "調理師、調理補助、シェフ、パティシエ"),
    ("サービス・販売・外食", "その他小売・流通・外食・アミューズメント関連職"),
    ("サービス・販売・外食", "美容師、理容師"),
    ("サービス・販売・外食", "エステティシャン"),
    ("サービス・販売・外食", "アロマセラピスト、ネイリスト"),
    ("サービス・販売・外食", "トリマー"),
    ("サービス・販売・外食", "その他美容・エステ・リラクゼーション関連職"),
    ("サービス・販売・外食", "旅行手配、添乗員、ツアーコンダクター"),
    ("サービス・販売・外食", "カウンタースタッフ、予約手配、オペレーター"),
    ("サービス・販売・外食", "ホテル、旅館、宿泊施設サービス"),
    ("サービス・販売・外食", "ホテル支配人"),
    ("サービス・販売・外食", "客室乗務員【CA】、グランドスタッフ、グランドハンドリング、パイロット、航空管制官"),
    ("サービス・販売・外食", "ウェディングプランナー、ブライダルコーディネーター、ドレスコーディネーター"),
    ("サービス・販売・外食", "葬祭ディレクター・プランナー"),
    ("サービス・販売・外食", "その他旅行・ホテル・航空・ブライダル・葬祭関連職"),
    ("Web・インターネット・ゲーム", "Webプロデューサー、Webディレクター、Webマスター、Web企画、Webプランナー"),
    ("Web・インターネット・ゲーム", "Web編集、コンテンツ企画"),
    ("Web・インターネット・ゲーム", "Webデザイナー、フロントエンドエンジニア、コーダー、フラッシャー"),
    ("Web・インターネット・ゲーム", "情報アーキテクト、UI/UXデザイナー"),
    ("Web・インターネット・ゲーム", "システムディレクター、テクニカルディレクター"),
    ("Web・インターネット・ゲーム", "アクセス解析、統計解析、データ分析、データアナリスト"),
    ("Web・インターネット・ゲーム", "SEOコンサルタント、SEMコンサルタント"),
    ("Web・インターネット・ゲーム", "ホームページ管理、Web担当者"),
    ("Web・インターネット・ゲーム", "ECサイト運営"),
    ("Web・インターネット・ゲーム", "その他Web担当者、インターネット関連"),
    ("Web・インターネット・ゲーム", "ゲームプロデューサー、ディレクター"),
    ("Web・インターネット・ゲーム", "ゲームデザイナー、ゲームプランナー、ゲーム企画、シナリオライター"),
    ("Web・インターネット・ゲーム", "ゲームプログラマ、ゲームエンジニア"),
    ("Web・インターネット・ゲーム", "CGデザイナー、グラフィックデザイナー、イラストレーター"),
    ("Web・インターネット・ゲーム", "サウンドクリエイター、サウンドプログラマ"),
    ("Web・インターネット・ゲーム", "その他ゲーム・マルチメディア関連職"),
    ("クリエイティブ【メディア・アパレルデザイン】", "クリエイティブディレクター"),
    ("クリエイティブ【メディア・アパレルデザイン】", "アートディレクター"),
    ("クリエイティブ【メディア・アパレルデザイン】", "アカウントエグゼクティブ【AE】、アカウントプランナー【AP】"),
    ("クリエイティブ【メディア・アパレルデザイン】", "メディアプランナー"),
    ("クリエイティブ【メディア・アパレルデザイン】", "プロモーションプロデューサー・ディレクター"),
    ("クリエイティブ【メディア・アパレルデザイン】", "コピーライター"),
    ("クリエイティブ【メディア・アパレルデザイン】", "グラフィックデザイナー"),
    ("クリエイティブ【メディア・アパレルデザイン】", "制作進行管理"),
    ("クリエイティブ【メディア・アパレルデザイン】", "フォトグラファー、カメラマン"),
    ("クリエイティブ【メディア・アパレルデザイン】", "イラストレーター【広告・グラフィック関連】"),
    ("クリエイティブ【メディア・アパレルデザイン】", "DTPオペレーター"),
    ("クリエイティブ【メディア・アパレルデザイン】", "その他広告・グラフィック関連職"),
    ("クリエイティブ【メディア・アパレルデザイン】", "編集、エディター、デスク、校正"),
    ("クリエイティブ【メディア・アパレルデザイン】", "記者、ライター"),
    ("クリエイティブ【メディア・アパレルデザイン】", "テクニカルライター"),
    ("クリエイティブ【メディア・アパレルデザイン】", "その他出版・印刷関連職"),
    ("クリエイティブ【メディア・アパレルデザイン】", "プロデューサー"),
    ("クリエイティブ【メディア・アパレルデザイン】", "ディレクター、プランナー、監督、演出"),
    ("クリエイティブ【メディア・アパレルデザイン】", "脚本家、放送作家、シナリオライター"),
    ("クリエイティブ【メディア・アパレルデザイン】", "映像制作、編集、技術、音響、照明、カメラ"),
    ("クリエイティブ【メディア・アパレルデザイン】", "アニメーター"),
    ("クリエイティブ【メディア・アパレルデザイン】", "AP【アシスタントプロデューサー】、AD【アシスタントディレクター】、進行"),
    ("クリエイティブ【メディア・アパレルデザイン】", "アナウンサー、俳優、モデル、コンパニオン"),
    ("クリエイティブ【メディア・アパレルデザイン】", "声優、ナレーター"),
    ("クリエイティブ【メディア・アパレルデザイン】", "芸能マネージャー"),
    ("クリエイティブ【メディア・アパレルデザイン】", "その他映像・音響・イベント・芸能・テレビ・放送関連職"),
    ("クリエイティブ【メディア・アパレルデザイン】", "ファッションデザイナー、服飾雑貨デザイナー"),
    ("クリエイティブ【メディア・アパレルデザイン】", "テキスタイルデザイナー"),
    ("クリエイティブ【メディア・アパレルデザイン】", "アクセサリーデザイナー、ジュエリーデザイナー"),
    ("クリエイティブ【メディア・アパレルデザイン】", "パタンナー、縫製"),
    ("クリエイティブ【メディア・アパレルデザイン】", "ソーイングスタッフ、ファッションリフォーマー"),
    ("クリエイティブ【メディア・アパレルデザイン】", "スタイリスト、ヘアメイク、メイクアップアーティスト"),
    ("クリエイティブ【メディア・アパレルデザイン】", "インテリアコーディネーター、インテリアプランナー、インテリアデザイナー"),
    ("クリエイティブ【メディア・アパレルデザイン】", "店舗・空間デザイナー"),
    ("クリエイティブ【メディア・アパレルデザイン】", "工業デザイナー、プロダクトデザイナー"),
    ("クリエイティブ【メディア・アパレルデザイン】", "カラーコーディネーター"),
    ("クリエイティブ【メディア・アパレルデザイン】", "生産管理・品質管理【ファッション・インテリア・空間デザイン・プロダクトデザイン関連】"),
    ("クリエイティブ【メディア・アパレルデザイン】", "その他ファッション・インテリア・空間・プロダクトデザイン関連職"),
    ("専門職【コンサルタント・士業・金融・不動産】", "経営コンサルタント、戦略コンサルタント"),
    ("専門職【コンサルタント・士業・金融・不動産】", "財務コンサルタント、会計コンサルタント"),
    ("専門職【コンサルタント・士業・金融・不動産】", "組織コンサルタント、人事コンサルタント、業務プロセスコンサルタント"),
    ("専門職【コンサルタント・士業・金融・不動産】", "生産コンサルタント、物流コンサルタント"),
    ("専門職【コンサルタント・士業・金融・不動産】", "営業コンサルタント、マーケティングコンサルタント"),
    ("専門職【コンサルタント・士業・金融・不動産】", "ISOコンサルタント、ISO審査員"),
    ("専門職【コンサルタント・士業・金融・不動産】", "公開業務【IPO】"),
    ("専門職【コンサルタント・士業・金融・不動産】", "研究調査員、リサーチャー"),
    ("専門職【コンサルタント・士業・金融・不動産】", "環境調査、環境分析"),
    ("専門職【コンサルタント・士業・金融・不動産】", "その他コンサルタント"),
    ("専門職【コンサルタント・士業・金融・不動産】", "公認会計士、税理士"),
    ("専門職【コンサルタント・士業・金融・不動産】", "弁護士、弁理士、特許技術者"),
    ("専門職【コンサルタント・士業・金融・不動産】", "司法書士、行政書士"),
    ("専門職【コンサルタント・士業・金融・不動産】", "社会保険労務士、中小企業診断士"),
    ("専門職【コンサルタント・士業・金融・不動産】", "技術コンサルタント"),
    ("専門職【コンサルタント・士業・金融・不動産】", "士業補助者"),
    ("専門職【コンサルタント・士業・金融・不動産】", "その他専門コンサルタント"),
    ("専門職【コンサルタント・士業・金融・不動産】", "ディーラー、トレーダー、ファンドマネージャー、運用業務"),
    ("専門職【コンサルタント・士業・金融・不動産】", "アクチュアリー、クオンツ、金融商品開発"),
    ("専門職【コンサルタント・士業・金融・不動産】", "投資銀行業務【インベストバンキング】、M&A業務、ストラテジックファイナンス"),
    ("専門職【コンサルタント・士業・金融・不動産】", "アナリスト、エコノミスト、リサーチ"),
    ("専門職【コンサルタント・士業・金融・不動産】", "金融法人営業"),
    ("専門職【コンサルタント・士業・金融・不動産】", "FP【ファイナンシャルプランナー】、金融個人営業"),
    ("専門職【コンサルタント・士業・金融・不動産】", "金融代理店営業、パートナーセールス"),
    ("専門職【コンサルタント・士業・金融・不動産】", "事務・管理【銀行系】"),
    ("専門職【コンサルタント・士業・金融・不動産】", "事務・管理【生損保系】"),
    ("専門職【コンサルタント・士業・金融・不動産】", "事務・管理【信託系】"),
    ("専門職【コンサルタント・士業・金融・不動産】", "事務・管理【証券系】"),
    ("専門職【コンサルタント・士業・金融・不動産】", "事務・管理【カード・信販・ノンバンク系】"),
    ("専門職【コンサルタント・士業・金融・不動産】", "事務・管理【商品取引系】"),
    ("専門職【コンサルタント・士業・金融・不動産】", "金融システム企画"),
    ("専門職【コンサルタント・士業・金融・不動産】", "リスク・与信・債権管理"),
    ("専門職【コンサルタント・士業・金融・不動産】", "アンダーライター、生損保系専門職【査定・損害調査等】"),
    ("専門職【コンサルタント・士業・金融・不動産】", "その他金融専門職"),
    ("専門職【コンサルタント・士業・金融・不動産】", "用地仕入、不動産仕入"),
    ("専門職【コンサルタント・士業・金融・不動産】", "不動産営業"),
    ("専門職【コンサルタント・士業・金融・不動産】", "不動産鑑定、デューデリジェンス"),
    ("専門職【コンサルタント・士業・金融・不動産】", "不動産管理、マンション管理、ビル管理"),
    ("専門職【コンサルタント・士業・金融・不動産】", "プロパティマネージャー"),
    ("専門職【コンサルタント・士業・金融・不動産】", "ファシリティマネージャー"),
    ("専門職【コンサルタント・士業・金融・不動産】", "アセットマネージャー"),
    ("専門職【コンサルタント・士業・金融・不動産】", "不動産事業企画、不動産開発"),
    ("専門職【コンサルタント・士業・金融・不動産】", "その他不動産専門職"),
    ("ITエンジニア【システム開発・SE・インフラ】", "システムアナリスト"),
    ("ITエンジニア【システム開発・SE・インフラ】", "システムコンサルタント"),
    ("ITエンジニア【システム開発・SE・インフラ】", "システムアーキテクト、ITアーキテクト"),
    ("ITエンジニア【システム開発・SE・インフラ】", "パッケージ導入コンサルタント【ERP・SCM・CRM等】"),
    ("ITエンジニア【システム開発・SE・インフラ】", "パッケージ導入コンサルタント【OS・メール・グループウェア等】"),
    ("ITエンジニア【システム開発・SE・インフラ】", "セキュリティコンサルタント、セキュリティエンジニア"),
    ("ITエンジニア【システム開発・SE・インフラ】", "プリセールス、セールスエンジニア"),
    ("ITエンジニア【システム開発・SE・インフラ】", "Web・オープン系 プロジェクトマネージャー【PM】、リーダー【PL】"),
    ("ITエンジニア【システム開発・SE・インフラ】", "Web・オープン系 SE【アプリケーション設計】"),
    ("ITエンジニア【システム開発・SE・インフラ】", "Web・オープン系 SE【データベース設計】"),
    ("ITエンジニア【システム開発・SE・インフラ】", "Web・オープン系 プログラマ【PG】"),
    ("ITエンジニア【システム開発・SE・インフラ】", "Web・オープン系 SE【モバイル・スマートフォン】"),
    ("ITエンジニア【システム開発・SE・インフラ】", "汎用機系 プロジェクトマネージャー【PM】、リーダー【PL】"),
    ("ITエンジニア【システム開発・SE・インフラ】", "汎用機系 SE【アプリケーション設計】"),
    ("ITエンジニア【システム開発・SE・インフラ】", "汎用機系 SE【データベース設計】"),
    ("ITエンジニア【システム開発・SE・インフラ】", "汎用機系 プログラマ【PG】"),
    ("ITエンジニア【システム開発・SE・インフラ】", "制御系 プロジェクトマネージャー【PM】、リーダー【PL】"),
    ("ITエンジニア【システム開発・SE・インフラ】", "制御系 SE【ソフトウェア設計】"),
    ("ITエンジニア【システム開発・SE・インフラ】", "制御系 プログラマ【PG】"),
    ("ITエンジニア【システム開発・SE・インフラ】", "組み込み系 プロジェクトマネージャー【PM】、リーダー【PL】"),
    ("ITエンジニア【システム開発・SE・インフラ】", "組み込み系 SE【ソフトウェア設計】"),
    ("ITエンジニア【システム開発・SE・インフラ】", "組み込み系 プログラマ【PG】"),
    ("ITエンジニア【システム開発・SE・インフラ】", "パッケージソフト・ミドルウェア プロダクトマネージャー、リーダー【PL】"),
    ("ITエンジニア【システム開発・SE・インフラ】", "パッケージソフト・ミドルウェア 開発エンジニア"),
    ("ITエンジニア【システム開発・SE・インフラ】", "パッケージソフト・ミドルウェア QAエンジニア"),
    ("ITエンジニア【システム開発・SE・インフラ】", "パッケージソフト・ミドルウェア ローカライズ"),
    ("ITエンジニア【システム開発・SE・インフラ】", "ネットワーク設計・ネットワーク構築"),
    ("ITエンジニア【システム開発・SE・インフラ】", "サーバ設計・サーバ構築"),
    ("ITエンジニア【システム開発・SE・インフラ】", "通信インフラ計画・通信インフラ策定"),
    ("ITエンジニア【システム開発・SE・インフラ】", "通信インフラ設計・通信インフラ構築【有線系】"),
    ("ITエンジニア【システム開発・SE・インフラ】", "通信インフラ設計・通信インフラ構築【無線系】"),
    ("ITエンジニア【システム開発・SE・インフラ】", "通信インフラ設置・通信インフラテスト"),
    ("ITエンジニア【システム開発・SE・インフラ】", "サーバ運用・保守"),
];

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingSource;

    impl TaxonomySource for FailingSource {
        fn load(&self) -> Result<Vec<TaxonomyEntry>> {
            Err(Error::Taxonomy {
                message: "unreadable".to_string(),
                source: None,
            })
        }

        fn describe(&self) -> String {
            "failing".to_string()
        }
    }

    #[test]
    fn test_embedded_lookup() {
        let taxonomy = Taxonomy::embedded();
        assert_eq!(taxonomy.major_for("経理"), Some("事務・管理"));
        assert_eq!(
            taxonomy.major_for("Web・オープン系 プログラマ【PG】"),
            Some("ITエンジニア【システム開発・SE・インフラ】")
        );
        assert_eq!(taxonomy.major_for("宇宙飛行士"), None);
        assert!(taxonomy.contains_minor("その他営業関連職"));
    }

    #[test]
    fn test_first_match_wins() {
        let taxonomy = Taxonomy::new(vec![
            TaxonomyEntry::new("A", "dup"),
            TaxonomyEntry::new("B", "dup"),
        ]);
        assert_eq!(taxonomy.major_for("dup"), Some("A"));
    }

    #[test]
    fn test_options_filtered_by_link_key() {
        let taxonomy = Taxonomy::new(vec![
            TaxonomyEntry::new("A", "one").with_link_key("x"),
            TaxonomyEntry::new("A", "two").with_link_key("y"),
            TaxonomyEntry::new("B", "three").with_link_key("x"),
        ]);
        assert_eq!(taxonomy.options_for(Some("x")), vec!["one", "three"]);
        assert_eq!(taxonomy.options_for(Some("")), vec!["one", "two", "three"]);
        assert_eq!(taxonomy.options_for(None).len(), 3);
    }

    #[test]
    fn test_options_never_empty_for_unknown_key() {
        let taxonomy = Taxonomy::embedded();
        let options = taxonomy.options_for(Some("no-such-key"));
        assert_eq!(options.len(), taxonomy.len());
    }

    #[test]
    fn test_read_entries_with_bom_and_optional_link_key() {
        let data = "\u{feff}major,minor,link\nA,one,k1\nB,two\n,broken,\n";
        let entries = read_entries(data.as_bytes()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].link_key, "k1");
        assert_eq!(entries[1], TaxonomyEntry::new("B", "two"));
    }

    #[test]
    fn test_failed_source_falls_back_to_embedded() {
        let taxonomy = Taxonomy::load_or_embedded(&FailingSource);
        assert_eq!(taxonomy, Taxonomy::embedded());
    }

    #[test]
    fn test_missing_file_falls_back_to_embedded() {
        let taxonomy =
            Taxonomy::from_optional_path(Some(Path::new("/definitely/not/here.csv")));
        assert_eq!(taxonomy.len(), Taxonomy::embedded().len());
    }

    #[test]
    fn test_majors_in_first_seen_order() {
        let table = Taxonomy::embedded();
        let majors = table.majors();
        assert_eq!(majors.first(), Some(&"営業"));
        assert_eq!(majors.len(), 8);
    }
}
