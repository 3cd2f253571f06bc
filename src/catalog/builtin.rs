//! Built-in Russian curriculum

pub(super) const ASSESSMENT_WORDS: &[&str] = &[
    "мама", "дом", "кот", "сок", "луна", "рыба", "нос", "сад", "утка", "лиса",
];

pub(super) const UNITS: &[(&str, &[&str])] = &[
    ("А", &["а", "мама", "папа", "рама", "лапа", "каша", "банан", "сага"]),
    ("О", &["он", "оно", "сом", "кот", "нос", "дом", "окно", "молоко", "ворон", "облако"]),
    ("У", &["ум", "усы", "утка", "улица", "муха", "рука"]),
    ("М", &["мак", "мол", "мука", "море", "мыло", "замок", "мост"]),
    ("Л", &["лук", "лом", "лето", "луна", "лодка", "стол", "волк", "лиса"]),
    ("Н", &["нос", "нога", "нора", "сон", "сын", "ночь"]),
    ("Р", &["рак", "рот", "рыба", "река", "роза", "гора", "сыр"]),
    ("С", &["сок", "сад", "сани", "сова", "село", "лес", "осы"]),
    ("К", &["кот", "кит", "каша", "кран", "рука", "мак"]),
    ("Т", &["торт", "тина", "утро", "тетрадь", "стул", "кот"]),
    ("И", &["ива", "игра", "нитки", "кино", "лиса", "тигр"]),
    ("Ы", &["мы", "ты", "вы", "сыр", "дым", "рыба", "мышь"]),
    ("П", &["пол", "пила", "парк", "суп", "сапог", "пенал"]),
    ("Д", &["дом", "дуб", "дыня", "вода", "сад", "дети"]),
    ("Б", &["бак", "бусы", "банан", "зуб", "белка", "рыба"]),
    ("В", &["вода", "ваза", "волк", "сова", "трава", "вилка"]),
    ("Г", &["гусь", "гора", "нога", "друг", "игра", "гриб"]),
    ("З", &["зуб", "зонт", "коза", "роза", "ваза", "звезда"]),
    ("Е", &["ель", "лес", "мел", "река", "лето", "перо"]),
    ("Ж", &["жук", "жаба", "нож", "лужа", "ёжик", "лыжи"]),
    ("Ш", &["шар", "шуба", "шапка", "каша", "мышь", "кошка"]),
    ("Я", &["яма", "ягода", "яблоко", "моя", "заяц", "земля"]),
    ("Ю", &["юла", "юбка", "каюта", "утюг", "ключ"]),
    ("Ё", &["ёж", "ёлка", "мёд", "лёд", "клён"]),
    ("Х", &["хлеб", "халат", "муха", "ухо", "мох", "петух"]),
    ("Ц", &["цапля", "цирк", "лицо", "овца", "птица", "огурец"]),
    ("Ч", &["чай", "чашка", "туча", "ночь", "мяч", "ключ"]),
    ("Щ", &["щука", "щётка", "роща", "плащ", "ящик"]),
    ("Ф", &["флаг", "фото", "шарф", "кофта", "шкаф"]),
    ("Э", &["эхо", "этаж", "поэт", "экран"]),
    ("Й", &["йод", "чай", "мой", "зайка", "лейка"]),
    ("Ь", &["конь", "соль", "день", "пень", "мель", "пальто"]),
    ("Ъ", &["подъезд", "съел", "объём", "въезд"]),
];
